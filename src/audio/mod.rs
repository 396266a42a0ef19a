pub mod buffer;
pub mod cache;
pub mod decode;

pub use buffer::SampleBuffer;
pub use cache::BufferCache;
pub use decode::decode_file;
