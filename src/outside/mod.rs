mod github;
mod http;

pub use github::GithubRemote;
pub use http::{Credentials, HttpTransport, Transport};
