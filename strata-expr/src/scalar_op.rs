use std::fmt::{Display, Formatter};
use std::sync::Arc;

use strata_engine::PartitioningTag;
use strata_error::{StrataResult, strata_bail};

use crate::{ExprRef, MatrixExpr};

/// The elementwise matrix-scalar operations.
///
/// `Sub`/`Div` put the matrix element on the left of the operator,
/// `SubFrom`/`DivInto` on the right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarOpKind {
    Add,
    Sub,
    SubFrom,
    Mul,
    Div,
    DivInto,
}

impl ScalarOpKind {
    pub const ALL: [ScalarOpKind; 6] = [
        ScalarOpKind::Add,
        ScalarOpKind::Sub,
        ScalarOpKind::SubFrom,
        ScalarOpKind::Mul,
        ScalarOpKind::Div,
        ScalarOpKind::DivInto,
    ];

    pub fn symbol(&self) -> &'static str {
        match self {
            ScalarOpKind::Add => "+",
            ScalarOpKind::Sub => "-",
            ScalarOpKind::SubFrom => "-:",
            ScalarOpKind::Mul => "*",
            ScalarOpKind::Div => "/",
            ScalarOpKind::DivInto => "/:",
        }
    }

    /// Parse an operation tag, failing on anything outside the fixed set.
    pub fn from_symbol(symbol: &str) -> StrataResult<Self> {
        for kind in Self::ALL {
            if kind.symbol() == symbol {
                return Ok(kind);
            }
        }
        strata_bail!(InvalidOperation: "unrecognized elementwise operation {symbol:?}")
    }

    /// Apply the operation to one element.
    pub fn apply(&self, x: f64, scalar: f64) -> f64 {
        match self {
            ScalarOpKind::Add => x + scalar,
            ScalarOpKind::Sub => x - scalar,
            ScalarOpKind::SubFrom => scalar - x,
            ScalarOpKind::Mul => x * scalar,
            ScalarOpKind::Div => x / scalar,
            ScalarOpKind::DivInto => scalar / x,
        }
    }

    /// Whether the operation maps zero elements to zero, i.e. whether a
    /// sparse row stays sparse under it.
    pub fn preserves_zero(&self, scalar: f64) -> bool {
        self.apply(0.0, scalar) == 0.0
    }
}

impl Display for ScalarOpKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

/// An elementwise matrix-scalar expression node.
///
/// Shape and partitioning come straight from the operand; the node never
/// touches key coverage, so its missing-rows flag is fixed to `false` even
/// over gappy integer-keyed operands. Immutable after construction.
#[derive(Debug, Clone)]
pub struct ScalarOp {
    child: ExprRef,
    kind: ScalarOpKind,
    scalar: f64,
}

impl ScalarOp {
    /// Build a node applying `kind` with `scalar` to every element of
    /// `child`. The scalar must be finite.
    pub fn try_new(child: ExprRef, kind: ScalarOpKind, scalar: f64) -> StrataResult<Self> {
        if !scalar.is_finite() {
            strata_bail!("elementwise scalar must be finite, got {scalar}");
        }
        Ok(Self {
            child,
            kind,
            scalar,
        })
    }

    pub fn try_new_expr(child: ExprRef, kind: ScalarOpKind, scalar: f64) -> StrataResult<ExprRef> {
        Self::try_new(child, kind, scalar).map(|op| Arc::new(op) as ExprRef)
    }

    pub fn child(&self) -> &ExprRef {
        &self.child
    }

    pub fn kind(&self) -> ScalarOpKind {
        self.kind
    }

    pub fn scalar(&self) -> f64 {
        self.scalar
    }
}

impl Display for ScalarOp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({} {} {})", self.child, self.kind, self.scalar)
    }
}

impl MatrixExpr for ScalarOp {
    fn nrow(&self) -> StrataResult<u64> {
        self.child.nrow()
    }

    fn ncol(&self) -> StrataResult<u32> {
        self.child.ncol()
    }

    fn partitioning_tag(&self) -> PartitioningTag {
        self.child.partitioning_tag()
    }

    fn can_have_missing_rows(&self) -> StrataResult<bool> {
        Ok(false)
    }

    fn children(&self) -> Vec<&ExprRef> {
        vec![&self.child]
    }
}

/// Create a node adding `scalar` to every element.
pub fn add_scalar(child: ExprRef, scalar: f64) -> StrataResult<ExprRef> {
    ScalarOp::try_new_expr(child, ScalarOpKind::Add, scalar)
}

/// Create a node subtracting `scalar` from every element.
pub fn sub_scalar(child: ExprRef, scalar: f64) -> StrataResult<ExprRef> {
    ScalarOp::try_new_expr(child, ScalarOpKind::Sub, scalar)
}

/// Create a node subtracting every element from `scalar`.
pub fn sub_from_scalar(child: ExprRef, scalar: f64) -> StrataResult<ExprRef> {
    ScalarOp::try_new_expr(child, ScalarOpKind::SubFrom, scalar)
}

/// Create a node multiplying every element by `scalar`.
pub fn mul_scalar(child: ExprRef, scalar: f64) -> StrataResult<ExprRef> {
    ScalarOp::try_new_expr(child, ScalarOpKind::Mul, scalar)
}

/// Create a node dividing every element by `scalar`.
pub fn div_scalar(child: ExprRef, scalar: f64) -> StrataResult<ExprRef> {
    ScalarOp::try_new_expr(child, ScalarOpKind::Div, scalar)
}

/// Create a node dividing `scalar` by every element.
pub fn div_into_scalar(child: ExprRef, scalar: f64) -> StrataResult<ExprRef> {
    ScalarOp::try_new_expr(child, ScalarOpKind::DivInto, scalar)
}
