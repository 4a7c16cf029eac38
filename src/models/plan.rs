use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumIter, EnumString};

/// License plans. Limits live in [`PLAN_TABLE`], not on the variants.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    AsRefStr,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Plan {
    Free,
    Trial,
    ProMonthly,
    ProAnnual,
    ProLifetime,
    EnterpriseAnnual,
    EnterpriseLifetime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Billing {
    Free,
    Trial,
    Monthly,
    Annual,
    OneTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanSpec {
    pub plan: Plan,
    pub max_activations: u32,
    pub billing: Billing,
}

/// Seat limits per plan. Rows are in `Plan` declaration order.
pub const PLAN_TABLE: &[PlanSpec] = &[
    PlanSpec { plan: Plan::Free, max_activations: 1, billing: Billing::Free },
    PlanSpec { plan: Plan::Trial, max_activations: 1, billing: Billing::Trial },
    PlanSpec { plan: Plan::ProMonthly, max_activations: 2, billing: Billing::Monthly },
    PlanSpec { plan: Plan::ProAnnual, max_activations: 2, billing: Billing::Annual },
    PlanSpec { plan: Plan::ProLifetime, max_activations: 3, billing: Billing::OneTime },
    PlanSpec { plan: Plan::EnterpriseAnnual, max_activations: 10, billing: Billing::Annual },
    PlanSpec { plan: Plan::EnterpriseLifetime, max_activations: 10, billing: Billing::OneTime },
];

/// Upper bound for an explicit `max_activations` override at creation.
pub const MAX_ACTIVATIONS_CEILING: u32 = 1000;

impl Plan {
    pub fn spec(self) -> &'static PlanSpec {
        &PLAN_TABLE[self as usize]
    }

    pub fn max_activations(self) -> u32 {
        self.spec().max_activations
    }

    pub fn billing(self) -> Billing {
        self.spec().billing
    }
}
