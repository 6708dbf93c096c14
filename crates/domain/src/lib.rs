mod comment;
mod proxy;
mod transcript;
mod video_id;

pub use comment::{CommentPage, CommentRecord, SortMode, sort_comments};
pub use proxy::{ProxyConfig, ProxyError};
pub use transcript::{Transcript, TranscriptSegment};
pub use video_id::VideoId;
