// Three-step application wizard
//
// Steps are staged in the DraftStore under the caller's session token and
// only become a venture on submit.

use super::{Ports, SessionContext};
use crate::domain::{
    ApplicationSource, Role, StreamDefinition, StreamSelfStatus, SupportType, Venture,
    VentureStream,
};
use crate::error::{AppError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::info;

pub const MAX_NEED_HELP_STREAMS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    VentureDefinition,
    Commitment,
    SupportNeeds,
}

impl WizardStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            WizardStep::VentureDefinition => "venture_definition",
            WizardStep::Commitment => "commitment",
            WizardStep::SupportNeeds => "support_needs",
        }
    }
}

impl std::str::FromStr for WizardStep {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "venture_definition" | "1" => Ok(WizardStep::VentureDefinition),
            "commitment" | "2" => Ok(WizardStep::Commitment),
            "support_needs" | "3" => Ok(WizardStep::SupportNeeds),
            other => Err(AppError::Validation(format!("Unknown wizard step: {}", other))),
        }
    }
}

/// Step 1: the current business and the new venture it grows into
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VentureDefinition {
    pub current_product: String,
    pub current_segment: String,
    pub current_geography: String,
    pub current_business_model: String,
    pub venture_product: Option<String>,
    pub venture_segment: Option<String>,
    pub venture_geography: Option<String>,
    pub venture_business_model: Option<String>,
    pub venture_description: Option<String>,
    pub expected_revenue_range: Option<String>,
}

impl VentureDefinition {
    fn validate(&self) -> Result<()> {
        if self.current_product.trim().is_empty() {
            return Err(AppError::Validation(
                "Describe the product you sell today".to_string(),
            ));
        }
        let changes = [
            &self.venture_product,
            &self.venture_segment,
            &self.venture_geography,
            &self.venture_business_model,
        ];
        if !changes
            .iter()
            .any(|f| f.as_deref().is_some_and(|v| !v.trim().is_empty()))
        {
            return Err(AppError::Validation(
                "The program is for ventures that change product, segment, geography or \
                 business model; this application describes none"
                    .to_string(),
            ));
        }
        Ok(())
    }
}

/// Step 2
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Commitment {
    pub progress_so_far: Option<String>,
    pub investment_willingness: Option<String>,
    pub resource_allocation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamAssessment {
    pub stream_number: i32,
    pub self_status: StreamSelfStatus,
    #[serde(default)]
    pub support_type: Option<SupportType>,
    #[serde(default)]
    pub support_type_other: Option<String>,
    #[serde(default)]
    pub end_deliverable: Option<String>,
}

/// Step 3: per-stream self-assessment and how the applicant found the program
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SupportNeeds {
    pub streams: Vec<StreamAssessment>,
    pub source: Option<ApplicationSource>,
    pub referrer_id: Option<String>,
}

impl SupportNeeds {
    fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for assessment in &self.streams {
            if StreamDefinition::by_number(assessment.stream_number).is_none() {
                return Err(AppError::Validation(format!(
                    "Unknown stream number: {}",
                    assessment.stream_number
                )));
            }
            if !seen.insert(assessment.stream_number) {
                return Err(AppError::Validation(format!(
                    "Stream {} assessed twice",
                    assessment.stream_number
                )));
            }
        }

        let need_help = self
            .streams
            .iter()
            .filter(|s| s.self_status == StreamSelfStatus::NeedHelp)
            .count();
        if need_help > MAX_NEED_HELP_STREAMS {
            return Err(AppError::Validation(format!(
                "At most {} streams can ask for help, got {}",
                MAX_NEED_HELP_STREAMS, need_help
            )));
        }
        Ok(())
    }
}

/// Everything staged so far for one session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApplicationDraft {
    pub venture_definition: Option<VentureDefinition>,
    pub commitment: Option<Commitment>,
    pub support_needs: Option<SupportNeeds>,
}

fn parse<T: DeserializeOwned>(step: WizardStep, data: serde_json::Value) -> Result<T> {
    serde_json::from_value(data)
        .map_err(|e| AppError::Validation(format!("Invalid {} data: {}", step.as_str(), e)))
}

async fn staged<T: DeserializeOwned>(
    ports: &Ports,
    ctx: &SessionContext,
    step: WizardStep,
) -> Result<Option<T>> {
    match ports.drafts.get(&ctx.token, step.as_str()).await? {
        Some(value) => Ok(Some(parse(step, value)?)),
        None => Ok(None),
    }
}

/// Validate and stage one step
pub async fn save_step(
    ports: &Ports,
    ctx: &SessionContext,
    step: WizardStep,
    data: serde_json::Value,
) -> Result<()> {
    ctx.require_role(&[Role::Entrepreneur], "apply")?;

    let normalized = match step {
        WizardStep::VentureDefinition => {
            let definition: VentureDefinition = parse(step, data)?;
            definition.validate()?;
            serde_json::to_value(definition)?
        }
        WizardStep::Commitment => serde_json::to_value(parse::<Commitment>(step, data)?)?,
        WizardStep::SupportNeeds => {
            let needs: SupportNeeds = parse(step, data)?;
            needs.validate()?;
            serde_json::to_value(needs)?
        }
    };

    ports.drafts.put(&ctx.token, ctx.expires_at, step.as_str(), normalized).await
}

pub async fn draft(ports: &Ports, ctx: &SessionContext) -> Result<ApplicationDraft> {
    Ok(ApplicationDraft {
        venture_definition: staged(ports, ctx, WizardStep::VentureDefinition).await?,
        commitment: staged(ports, ctx, WizardStep::Commitment).await?,
        support_needs: staged(ports, ctx, WizardStep::SupportNeeds).await?,
    })
}

/// Turn the staged steps into a submitted venture with its streams.
///
/// `support_needs` overrides a staged step 3 when given.
pub async fn submit(
    ports: &Ports,
    ctx: &SessionContext,
    support_needs: Option<SupportNeeds>,
) -> Result<Venture> {
    ctx.require_role(&[Role::Entrepreneur], "apply")?;

    let definition: VentureDefinition = staged(ports, ctx, WizardStep::VentureDefinition)
        .await?
        .ok_or_else(|| AppError::Validation("Step 1 (venture definition) is missing".to_string()))?;
    let commitment: Commitment = staged(ports, ctx, WizardStep::Commitment)
        .await?
        .ok_or_else(|| AppError::Validation("Step 2 (commitment) is missing".to_string()))?;
    let needs = match support_needs {
        Some(needs) => needs,
        None => staged(ports, ctx, WizardStep::SupportNeeds)
            .await?
            .unwrap_or_default(),
    };
    definition.validate()?;
    needs.validate()?;

    let now = ports.clock.now_millis();
    let mut venture = Venture::new(ports.ids.generate_id(), now, ctx.profile_id());
    venture.current_product = definition.current_product;
    venture.current_segment = definition.current_segment;
    venture.current_geography = definition.current_geography;
    venture.current_business_model = definition.current_business_model;
    venture.venture_product = definition.venture_product;
    venture.venture_segment = definition.venture_segment;
    venture.venture_geography = definition.venture_geography;
    venture.venture_business_model = definition.venture_business_model;
    venture.venture_description = definition.venture_description;
    venture.expected_revenue_range = definition.expected_revenue_range;
    venture.progress_so_far = commitment.progress_so_far;
    venture.investment_willingness = commitment.investment_willingness;
    venture.resource_allocation = commitment.resource_allocation;
    venture.source = needs.source;
    venture.referrer_id = needs.referrer_id;
    venture.submit(now)?;

    ports.ventures.insert(&venture).await?;

    let mut streams = Vec::with_capacity(needs.streams.len());
    for assessment in needs.streams {
        let Some(def) = StreamDefinition::by_number(assessment.stream_number) else {
            continue;
        };
        let mut stream = VentureStream::new(ports.ids.generate_id(), now, &venture.id, def);
        stream.assess(
            assessment.self_status,
            assessment.support_type,
            assessment.support_type_other,
        );
        stream.end_deliverable = assessment.end_deliverable;
        streams.push(stream);
    }
    if !streams.is_empty() {
        ports.streams.insert_many(&streams).await?;
    }

    ports.drafts.clear(&ctx.token).await?;

    info!(
        venture_id = %venture.id,
        entrepreneur_id = %venture.entrepreneur_id,
        streams = streams.len(),
        "Application submitted"
    );
    Ok(venture)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::TestBackend;
    use crate::domain::VentureStatus;
    use serde_json::json;

    fn step1() -> serde_json::Value {
        json!({
            "current_product": "Pickles",
            "current_segment": "Local retail",
            "current_geography": "Pune",
            "current_business_model": "B2C",
            "venture_geography": "Maharashtra",
        })
    }

    fn need_help(stream_number: i32, support: SupportType) -> StreamAssessment {
        StreamAssessment {
            stream_number,
            self_status: StreamSelfStatus::NeedHelp,
            support_type: Some(support),
            support_type_other: None,
            end_deliverable: None,
        }
    }

    #[tokio::test]
    async fn test_step1_requires_a_venture_change() {
        let backend = TestBackend::new();
        let ports = backend.ports();
        let ctx = backend.login("e-1", Role::Entrepreneur);

        let mut data = step1();
        data["venture_geography"] = json!("  ");
        let err = save_step(&ports, &ctx, WizardStep::VentureDefinition, data)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_too_many_need_help_streams() {
        let backend = TestBackend::new();
        let ports = backend.ports();
        let ctx = backend.login("e-1", Role::Entrepreneur);

        let needs = SupportNeeds {
            streams: (1..=4).map(|n| need_help(n, SupportType::Learn)).collect(),
            ..Default::default()
        };
        let err = save_step(&ports, &ctx, WizardStep::SupportNeeds, serde_json::to_value(needs).unwrap())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("At most 3"));
    }

    #[tokio::test]
    async fn test_submit_requires_steps_one_and_two() {
        let backend = TestBackend::new();
        let ports = backend.ports();
        let ctx = backend.login("e-1", Role::Entrepreneur);
        save_step(&ports, &ctx, WizardStep::VentureDefinition, step1()).await.unwrap();

        let err = submit(&ports, &ctx, None).await.unwrap_err();
        assert!(err.to_string().contains("Step 2"));
    }

    #[tokio::test]
    async fn test_submit_creates_venture_and_streams_and_clears_drafts() {
        let backend = TestBackend::new();
        let ports = backend.ports();
        let ctx = backend.login("e-1", Role::Entrepreneur);

        save_step(&ports, &ctx, WizardStep::VentureDefinition, step1()).await.unwrap();
        save_step(&ports, &ctx, WizardStep::Commitment, json!({"progress_so_far": "Pilot"}))
            .await
            .unwrap();

        let mut on_it = need_help(2, SupportType::Do);
        on_it.self_status = StreamSelfStatus::OnIt;
        let needs = SupportNeeds {
            streams: vec![need_help(1, SupportType::Connect), on_it],
            source: Some(ApplicationSource::CsmReferral),
            referrer_id: Some("csm-1".to_string()),
        };

        let venture = submit(&ports, &ctx, Some(needs)).await.unwrap();
        assert_eq!(venture.status, VentureStatus::Submitted);
        assert_eq!(venture.progress_so_far.as_deref(), Some("Pilot"));
        assert_eq!(venture.source, Some(ApplicationSource::CsmReferral));
        assert_eq!(venture.referrer_id.as_deref(), Some("csm-1"));

        let streams = ports.streams.list_for_venture(&venture.id).await.unwrap();
        assert_eq!(streams.len(), 2);
        assert_eq!(streams[0].support_type, Some(SupportType::Connect));
        // Support type only survives on need_help streams
        assert_eq!(streams[1].support_type, None);

        assert_eq!(draft(&ports, &ctx).await.unwrap(), ApplicationDraft::default());
    }

    #[tokio::test]
    async fn test_source_is_staged_with_support_needs() {
        let backend = TestBackend::new();
        let ports = backend.ports();
        let ctx = backend.login("e-1", Role::Entrepreneur);

        let mut data = step1();
        data["source"] = json!("platform_nudge");
        save_step(&ports, &ctx, WizardStep::VentureDefinition, data).await.unwrap();
        save_step(
            &ports,
            &ctx,
            WizardStep::SupportNeeds,
            json!({ "streams": [], "source": "ecosystem_referral" }),
        )
        .await
        .unwrap();
        save_step(&ports, &ctx, WizardStep::Commitment, json!({})).await.unwrap();

        let venture = submit(&ports, &ctx, None).await.unwrap();
        assert_eq!(venture.source, Some(ApplicationSource::EcosystemReferral));
    }

    #[tokio::test]
    async fn test_staff_cannot_apply() {
        let backend = TestBackend::new();
        let ctx = backend.login("m-1", Role::Mentor);
        let err = save_step(&backend.ports(), &ctx, WizardStep::Commitment, json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[test]
    fn test_step_names() {
        assert_eq!("2".parse::<WizardStep>().unwrap(), WizardStep::Commitment);
        assert_eq!(WizardStep::SupportNeeds.as_str(), "support_needs");
        assert!("4".parse::<WizardStep>().is_err());
    }
}
