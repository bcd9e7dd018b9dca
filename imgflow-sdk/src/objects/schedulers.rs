//! Scheduler names and the labeled option list shown in settings.

use serde::{Deserialize, Serialize};

/// Every scheduler the execution service accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulerName {
    Ddim,
    Ddpm,
    Deis,
    Lms,
    LmsK,
    Pndm,
    Heun,
    HeunK,
    Euler,
    EulerK,
    EulerA,
    #[serde(rename = "kdpm_2")]
    Kdpm2,
    #[serde(rename = "kdpm_2_a")]
    Kdpm2A,
    #[serde(rename = "dpmpp_2s")]
    Dpmpp2s,
    #[serde(rename = "dpmpp_2s_k")]
    Dpmpp2sK,
    #[serde(rename = "dpmpp_2m")]
    Dpmpp2m,
    #[serde(rename = "dpmpp_2m_k")]
    Dpmpp2mK,
    #[serde(rename = "dpmpp_2m_sde")]
    Dpmpp2mSde,
    #[serde(rename = "dpmpp_2m_sde_k")]
    Dpmpp2mSdeK,
    Unipc,
}

impl SchedulerName {
    pub const ALL: [SchedulerName; 20] = [
        SchedulerName::Ddim,
        SchedulerName::Ddpm,
        SchedulerName::Deis,
        SchedulerName::Lms,
        SchedulerName::LmsK,
        SchedulerName::Pndm,
        SchedulerName::Heun,
        SchedulerName::HeunK,
        SchedulerName::Euler,
        SchedulerName::EulerK,
        SchedulerName::EulerA,
        SchedulerName::Kdpm2,
        SchedulerName::Kdpm2A,
        SchedulerName::Dpmpp2s,
        SchedulerName::Dpmpp2sK,
        SchedulerName::Dpmpp2m,
        SchedulerName::Dpmpp2mK,
        SchedulerName::Dpmpp2mSde,
        SchedulerName::Dpmpp2mSdeK,
        SchedulerName::Unipc,
    ];

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            SchedulerName::Ddim => "DDIM",
            SchedulerName::Ddpm => "DDPM",
            SchedulerName::Deis => "DEIS",
            SchedulerName::Lms => "LMS",
            SchedulerName::LmsK => "LMS Karras",
            SchedulerName::Pndm => "PNDM",
            SchedulerName::Heun => "Heun",
            SchedulerName::HeunK => "Heun Karras",
            SchedulerName::Euler => "Euler",
            SchedulerName::EulerK => "Euler Karras",
            SchedulerName::EulerA => "Euler Ancestral",
            SchedulerName::Kdpm2 => "KDPM 2",
            SchedulerName::Kdpm2A => "KDPM 2 Ancestral",
            SchedulerName::Dpmpp2s => "DPM++ 2S",
            SchedulerName::Dpmpp2sK => "DPM++ 2S Karras",
            SchedulerName::Dpmpp2m => "DPM++ 2M",
            SchedulerName::Dpmpp2mK => "DPM++ 2M Karras",
            SchedulerName::Dpmpp2mSde => "DPM++ 2M SDE",
            SchedulerName::Dpmpp2mSdeK => "DPM++ 2M SDE Karras",
            SchedulerName::Unipc => "UniPC",
        }
    }
}

/// One selectable entry of the favorite-schedulers control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SchedulerOption {
    pub value: SchedulerName,
    pub label: &'static str,
}

/// All schedulers as labeled options, sorted by label.
///
/// Labels compare case-insensitively first so that "UniPC" sorts among the
/// "U"s regardless of its inner capitals.
pub fn scheduler_options() -> Vec<SchedulerOption> {
    let mut options: Vec<SchedulerOption> = SchedulerName::ALL
        .iter()
        .map(|&value| SchedulerOption {
            value,
            label: value.label(),
        })
        .collect();
    options.sort_by(|a, b| {
        a.label
            .to_lowercase()
            .cmp(&b.label.to_lowercase())
            .then_with(|| a.label.cmp(b.label))
    });
    options
}

/// Body of `GET /api/v1/settings/schedulers`.
#[derive(Debug, Clone, Serialize)]
pub struct SchedulerSettingsResponse {
    pub options: Vec<SchedulerOption>,
    pub favorites: Vec<SchedulerName>,
}

/// Body of `PUT /api/v1/settings/schedulers`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateFavoriteSchedulersRequest {
    pub favorites: Vec<SchedulerName>,
}
