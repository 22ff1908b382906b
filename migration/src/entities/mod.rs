pub mod shortened_link;

pub use shortened_link::Entity as ShortenedLinkEntity;
