pub mod autocomplete;
pub mod cancel;
pub mod combine;
pub mod context;
pub mod filter;
pub mod flows;
pub mod paginate;
pub mod submission;

#[cfg(test)]
pub(crate) mod testing;

pub use autocomplete::{TitleEntry, TitleIndex};
pub use cancel::{Cancelled, RequestSlot};
pub use combine::{combine, combine_rated, MetadataEntry};
pub use context::{Backends, PageContext};
pub use filter::{ActiveCriteria, CriterionTable, FilterCriterion, FilteredMovies};
pub use flows::{Fetched, MoviePage, RankedMovie};
pub use paginate::{Page, Paginator};
pub use submission::{FlowError, RatingReceipt, RatingState, ReviewDraft, ReviewReceipt, ValidationError};
