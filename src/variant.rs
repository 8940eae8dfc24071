//! The closed catalog of solver variants and their argument shapes.
//!
//! Every variant maps to exactly one solver executable stem and one
//! `VariantShape`. The encoder validates requests against the shape instead
//! of inferring the token layout from whichever optional fields happen to be
//! populated, so a mismatched request is rejected before a process spawns.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the supported knapsack problem families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProblemVariant {
    /// Each item taken at most once.
    ZeroOne,
    /// Unlimited copies of every item.
    Unbounded,
    /// Per-item copy limit.
    BoundedCount,
    /// 0/1, unbounded, and bounded items in one instance.
    Mixed,
    /// Weight and volume constraints together.
    TwoDimensionalCost,
    /// At most one item per group.
    Grouped,
    /// Item usable only if its main item is selected.
    Dependency,
    /// K-th best objective value instead of the optimum.
    KthOptimal,
    /// Number of ways to fill the knapsack exactly.
    SolutionCount,
    /// Dependencies forming a tree rather than a flat main/attachment split.
    TreeDependency,
}

/// Extra positional argument inserted between `capacity` and the item count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeadingArg {
    None,
    /// `k` for the k-th optimal family.
    K,
    /// Second capacity for the two-dimensional cost family.
    Capacity2,
}

/// Which optional item field a variant's token carries beyond `weight,value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemFields {
    /// `weight,value`
    Base,
    /// `weight,value,count`
    Count,
    /// `weight,value,type`
    Kind,
    /// `weight,volume,value` (volume sits between weight and value)
    Volume,
    /// `weight,value,group`
    Group,
    /// `weight,value,parent`
    Parent,
}

/// Full argument-shape descriptor for one variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariantShape {
    pub leading: LeadingArg,
    pub fields: ItemFields,
}

pub const ALL_VARIANTS: &[ProblemVariant] = &[
    ProblemVariant::ZeroOne,
    ProblemVariant::Unbounded,
    ProblemVariant::BoundedCount,
    ProblemVariant::Mixed,
    ProblemVariant::TwoDimensionalCost,
    ProblemVariant::Grouped,
    ProblemVariant::Dependency,
    ProblemVariant::KthOptimal,
    ProblemVariant::SolutionCount,
    ProblemVariant::TreeDependency,
];

impl ProblemVariant {
    /// Wire identifier used in request envelopes and the CLI.
    pub fn id(&self) -> &'static str {
        match self {
            ProblemVariant::ZeroOne => "zero_one",
            ProblemVariant::Unbounded => "unbounded",
            ProblemVariant::BoundedCount => "bounded_count",
            ProblemVariant::Mixed => "mixed",
            ProblemVariant::TwoDimensionalCost => "two_dimensional_cost",
            ProblemVariant::Grouped => "grouped",
            ProblemVariant::Dependency => "dependency",
            ProblemVariant::KthOptimal => "kth_optimal",
            ProblemVariant::SolutionCount => "solution_count",
            ProblemVariant::TreeDependency => "tree_dependency",
        }
    }

    /// File stem of the solver executable implementing this variant.
    pub fn solver_stem(&self) -> &'static str {
        match self {
            ProblemVariant::ZeroOne => "knapsack_01",
            ProblemVariant::Unbounded => "knapsack_complete",
            ProblemVariant::BoundedCount => "knapsack_multiple",
            ProblemVariant::Mixed => "knapsack_mixed",
            ProblemVariant::TwoDimensionalCost => "knapsack_2d",
            ProblemVariant::Grouped => "knapsack_group",
            ProblemVariant::Dependency => "knapsack_depend",
            ProblemVariant::KthOptimal => "knapsack_kth",
            ProblemVariant::SolutionCount => "knapsack_count",
            ProblemVariant::TreeDependency => "knapsack_tree",
        }
    }

    pub fn shape(&self) -> VariantShape {
        let (leading, fields) = match self {
            ProblemVariant::ZeroOne => (LeadingArg::None, ItemFields::Base),
            ProblemVariant::Unbounded => (LeadingArg::None, ItemFields::Base),
            ProblemVariant::BoundedCount => (LeadingArg::None, ItemFields::Count),
            ProblemVariant::Mixed => (LeadingArg::None, ItemFields::Kind),
            ProblemVariant::TwoDimensionalCost => (LeadingArg::Capacity2, ItemFields::Volume),
            ProblemVariant::Grouped => (LeadingArg::None, ItemFields::Group),
            ProblemVariant::Dependency => (LeadingArg::None, ItemFields::Parent),
            ProblemVariant::KthOptimal => (LeadingArg::K, ItemFields::Base),
            ProblemVariant::SolutionCount => (LeadingArg::None, ItemFields::Base),
            ProblemVariant::TreeDependency => (LeadingArg::None, ItemFields::Parent),
        };
        VariantShape { leading, fields }
    }
}

impl fmt::Display for ProblemVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ProblemVariant {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        ALL_VARIANTS
            .iter()
            .copied()
            .find(|variant| variant.id() == value)
            .ok_or_else(|| anyhow::anyhow!("unknown variant {value:?}"))
    }
}

impl ItemFields {
    /// Wire name of the extra field, if any.
    pub fn extra_field(&self) -> Option<&'static str> {
        match self {
            ItemFields::Base => None,
            ItemFields::Count => Some("count"),
            ItemFields::Kind => Some("type"),
            ItemFields::Volume => Some("volume"),
            ItemFields::Group => Some("group"),
            ItemFields::Parent => Some("parent"),
        }
    }

    /// Human-readable token layout for `khost variants` output.
    pub fn layout(&self) -> &'static str {
        match self {
            ItemFields::Base => "weight,value",
            ItemFields::Count => "weight,value,count",
            ItemFields::Kind => "weight,value,type",
            ItemFields::Volume => "weight,volume,value",
            ItemFields::Group => "weight,value,group",
            ItemFields::Parent => "weight,value,parent",
        }
    }
}

impl LeadingArg {
    pub fn field(&self) -> Option<&'static str> {
        match self {
            LeadingArg::None => None,
            LeadingArg::K => Some("k"),
            LeadingArg::Capacity2 => Some("capacity2"),
        }
    }
}
