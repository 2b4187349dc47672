//! Everything a feature module needs in one import.

pub use crate::context::{AppContext, ContextError, Notification, NotificationLevel};
pub use crate::module::{ModuleContext, ModuleDescriptor, ModuleError};
pub use crate::region::{ContentRegion, MemoryRegion, escape};
pub use crate::registry::{ModuleRegistry, RegistryError};
pub use crate::remote::{MemoryDocumentStore, OrCancelExt, RemoteError, RemoteStore, RemoteSync};
pub use crate::router::{RouteChanged, RouteState, Router, RouterError};
pub use crate::{CancellationToken, safe_nanoid, today};
pub use crate::state::{AppState, PersistOutcome, RestoreOutcome, StateChanged, StateError};
pub use farm_domain::app_data::{AppDataKey, SharedAppData};
pub use farm_domain::records::*;
