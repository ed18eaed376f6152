//! FIFO-by-expiry outtake planning (pure, no IO).

use serde::{Deserialize, Serialize};

use larder_core::{AllocationError, LotId};
use larder_lots::StockLot;

/// One draw of an outtake plan: `quantity` units taken from `lot_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LotDraw {
    pub lot_id: LotId,
    pub quantity: i64,
}

/// Ordered consumption plan for one outtake.
///
/// Callers persist one delivery-line record per draw, which is what links a
/// delivery back to the specific lots it was served from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OuttakePlan {
    pub allocations: Vec<LotDraw>,
}

impl OuttakePlan {
    /// Sum of all draws; equals the requested quantity on a successful plan.
    pub fn total(&self) -> i64 {
        self.allocations.iter().map(|d| d.quantity).sum()
    }
}

/// Compute the lot draws satisfying `requested` units from `lots`.
///
/// Consumption order: ascending expiry date, lots without an expiry after
/// all dated lots, ties broken by the caller-supplied order (creation
/// order). The function mutates nothing; the caller turns the plan into an
/// atomic commit.
pub fn plan_outtake(lots: &[StockLot], requested: i64) -> Result<OuttakePlan, AllocationError> {
    if requested <= 0 {
        return Err(AllocationError::invalid_quantity(requested));
    }

    let mut active: Vec<&StockLot> = lots.iter().filter(|l| l.remaining > 0).collect();
    // Stable sort keeps creation order for equal expiry dates.
    active.sort_by_key(|l| l.consumption_key());

    let available: i128 = active.iter().map(|l| i128::from(l.remaining)).sum();
    if available < i128::from(requested) {
        let available = i64::try_from(available).unwrap_or(i64::MAX);
        return Err(AllocationError::insufficient_stock(available, requested));
    }

    let mut still_needed = requested;
    let mut allocations = Vec::new();
    for lot in active {
        if still_needed == 0 {
            break;
        }
        let draw = lot.remaining.min(still_needed);
        allocations.push(LotDraw {
            lot_id: lot.id,
            quantity: draw,
        });
        still_needed -= draw;
    }

    Ok(OuttakePlan { allocations })
}
