// Content Generation Port
//
// Assessment text and checkpoint titles come from an external generator.
// Callers only see structured blocks.

use crate::domain::{ApplicationAssessment, StreamSelfStatus, Venture, VentureStream};
use crate::error::Result;
use async_trait::async_trait;

#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Assessment blocks for a submitted application
    async fn assess_application(
        &self,
        venture: &Venture,
        streams: &[VentureStream],
    ) -> Result<ApplicationAssessment>;

    /// Titles for the `count` checkpoint deliverables of a stream, in order
    async fn stream_checkpoints(&self, stream: &VentureStream, count: usize) -> Result<Vec<String>>;
}

/// Deterministic generator producing neutral templated blocks
pub struct TemplateContentGenerator;

#[async_trait]
impl ContentGenerator for TemplateContentGenerator {
    async fn assess_application(
        &self,
        _venture: &Venture,
        streams: &[VentureStream],
    ) -> Result<ApplicationAssessment> {
        let need_help: Vec<&VentureStream> = streams
            .iter()
            .filter(|s| s.self_status == Some(StreamSelfStatus::NeedHelp))
            .collect();

        Ok(ApplicationAssessment {
            tier_recommendation: None,
            failure_reasons: need_help
                .iter()
                .map(|s| format!("Support requested on {}", s.stream_name))
                .collect(),
            opportunity_reasons: streams
                .iter()
                .filter(|s| s.self_status == Some(StreamSelfStatus::Done))
                .map(|s| format!("{} already in place", s.stream_name))
                .collect(),
            probing_questions: need_help
                .iter()
                .map(|s| format!("What would completion of {} look like?", s.stream_name))
                .collect(),
            market_size: None,
            jobs_impact: None,
        })
    }

    async fn stream_checkpoints(&self, stream: &VentureStream, count: usize) -> Result<Vec<String>> {
        Ok((1..=count)
            .map(|seq| format!("{} - Checkpoint {}", stream.stream_name, seq))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{SupportType, STREAM_DEFINITIONS};

    #[tokio::test]
    async fn test_checkpoint_titles() {
        let s = VentureStream::new("s-1", 0, "v-1", &STREAM_DEFINITIONS[2]);
        let titles = TemplateContentGenerator.stream_checkpoints(&s, 5).await.unwrap();
        assert_eq!(titles.len(), 5);
        assert_eq!(titles[0], "People & Talent - Checkpoint 1");
    }

    #[tokio::test]
    async fn test_assessment_follows_self_assessment() {
        let v = Venture::new("v-1", 0, "p-1");
        let mut s = VentureStream::new("s-1", 0, "v-1", &STREAM_DEFINITIONS[0]);
        s.assess(StreamSelfStatus::NeedHelp, Some(SupportType::Learn), None);

        let a = TemplateContentGenerator.assess_application(&v, &[s]).await.unwrap();
        assert_eq!(a.failure_reasons.len(), 1);
        assert_eq!(a.probing_questions.len(), 1);
        assert!(a.opportunity_reasons.is_empty());
    }
}
