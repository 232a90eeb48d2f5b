mod blob;
mod recordings;

pub use self::{
    blob::{BlobStore, FileBlob},
    recordings::{JsonRecordings, RecordingStore},
};
