mod listing;
mod local_index;
mod remote_entry;
mod video_details;

pub use listing::ListingStrategy;
pub use local_index::LocalFileIndex;
pub use remote_entry::RemoteFileEntry;
pub use video_details::{Attach, VideoDetails};
