//! Domain model (IDs, counts, queries, locale catalogs, state, errors).
//!
//! ここは純粋なモデルのみ。ホスト・ネットワーク・時刻には依存しません。

pub mod count;
pub mod errors;
pub mod ids;
pub mod locale;
pub mod query;
pub mod result;
pub mod state;

pub use self::count::{DisplayCount, format_count};
pub use self::errors::{ChannelError, ConfigError, ErrorKind, LocaleLoadError};
pub use self::ids::{DispatchId, SubscriberId, WidgetId};
pub use self::locale::{LocaleTag, MessageCatalog, MessageDescriptor};
pub use self::query::{DispatchPayload, ProviderConfig, QueryKind, TemplateError};
pub use self::result::QueryResult;
pub use self::state::{PipelineState, WidgetDisplayState};
