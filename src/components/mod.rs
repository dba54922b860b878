// Pipeline stages
pub mod airtable;
pub mod events;
pub mod images;
pub mod instagram;
pub mod poster;

// Re-export the collaborator seams
pub use airtable::{RecordQuery, RecordSource};
pub use images::ImageRenderer;
pub use instagram::SocialPublisher;
pub use poster::{PostReport, Poster, PosterOptions};
