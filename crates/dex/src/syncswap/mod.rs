pub mod contracts;
pub mod path;
pub mod route;

pub use contracts::{Erc20Token, SyncSwapRouter};
pub use path::{build_swap_paths, encode_step_data};
pub use route::{parse_pair, resolve_route, validate_pair, ResolvedRoute, RouteError, RouteRequest, ValidatedPair};
