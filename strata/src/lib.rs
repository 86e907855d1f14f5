pub use strata_drm::*;
pub use {
    strata_engine as engine, strata_error as error, strata_expr as expr, strata_matrix as matrix,
};
