pub mod syncswap;

pub use syncswap::{
    build_swap_paths, encode_step_data, parse_pair, resolve_route, validate_pair,
    Erc20Token, ResolvedRoute, RouteError, RouteRequest, SyncSwapRouter, ValidatedPair,
};
