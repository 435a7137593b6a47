pub mod board;
pub mod candidates;
pub mod extract;
pub mod fetcher;
pub mod html;
pub mod pipeline;
pub mod resolve;
pub mod traits;
pub mod validate;

pub use board::LinkSet;
pub use candidates::CandidateGatherer;
pub use fetcher::{FetchedPage, HeadResponse, HttpFetcher, PageFetcher};
pub use pipeline::LinkPipeline;
pub use resolve::{Resolution, Resolver, ResolverSettings};
pub use traits::{Geocoder, ImageSearcher, MessageSource};
