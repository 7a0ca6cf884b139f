use std::sync::Arc;

use kuralist_core::{Category, ThresholdFilter};
use tokio::sync::oneshot;

use super::FilteredView;

/// Intents sent from handles to the engine task.
#[derive(Debug)]
pub(crate) enum Command {
    SetSearchText(String),
    SetCategory {
        category: Category,
        value: String,
    },
    ClearCategory(Category),
    /// Clears an active category, otherwise opens its option sheet.
    ToggleCategory(Category),
    ToggleThreshold(ThresholdFilter),
    ClearAll,
    RequestOptions {
        category: Category,
        reply: Option<oneshot::Sender<Arc<[String]>>>,
    },
    DismissSheet,
    /// Applies any pending search text now and replies with the resulting view.
    Flush(oneshot::Sender<FilteredView>),
    Shutdown,
}
