// SQLite ReviewRepository Implementation

use crate::error::{corrupt_column, map_sqlx_error, parse_opt};
use accelerate_core::domain::ApplicationReview;
use accelerate_core::error::Result;
use accelerate_core::port::ReviewRepository;
use async_trait::async_trait;
use sqlx::SqlitePool;

pub struct SqliteReviewRepository {
    pool: SqlitePool,
}

impl SqliteReviewRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReviewRepository for SqliteReviewRepository {
    async fn insert(&self, review: &ApplicationReview) -> Result<()> {
        let assessment = serde_json::to_string(&review.assessment)?;

        sqlx::query(
            r#"
            INSERT INTO application_reviews (
                id, venture_id, reviewer_id, reviewer_role, assessment,
                decision, decision_notes, triage_outcome, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&review.id)
        .bind(&review.venture_id)
        .bind(&review.reviewer_id)
        .bind(review.reviewer_role.as_str())
        .bind(assessment)
        .bind(review.decision.as_str())
        .bind(&review.decision_notes)
        .bind(review.triage_outcome.map(|o| o.as_str()))
        .bind(review.created_at)
        .bind(review.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn find_latest_for_venture(&self, venture_id: &str) -> Result<Option<ApplicationReview>> {
        let row = sqlx::query_as::<_, ReviewRow>(
            r#"
            SELECT * FROM application_reviews
            WHERE venture_id = ?
            ORDER BY created_at DESC, rowid DESC
            LIMIT 1
            "#,
        )
        .bind(venture_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.map(|r| r.into_review()).transpose()
    }
}

#[derive(sqlx::FromRow)]
struct ReviewRow {
    id: String,
    venture_id: String,
    reviewer_id: String,
    reviewer_role: String,
    assessment: String, // JSON
    decision: String,
    decision_notes: Option<String>,
    triage_outcome: Option<String>,
    created_at: i64,
    updated_at: i64,
}

impl ReviewRow {
    fn into_review(self) -> Result<ApplicationReview> {
        let assessment = serde_json::from_str(&self.assessment)
            .map_err(|e| corrupt_column("application_reviews", "assessment", e))?;

        Ok(ApplicationReview {
            id: self.id,
            venture_id: self.venture_id,
            reviewer_id: self.reviewer_id,
            reviewer_role: self.reviewer_role.parse()?,
            assessment,
            decision: self.decision.parse()?,
            decision_notes: self.decision_notes,
            triage_outcome: parse_opt(self.triage_outcome)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::seed_venture;
    use accelerate_core::domain::{ApplicationAssessment, JobsImpact, Role, TriageOutcome};

    #[tokio::test]
    async fn test_latest_review_wins() {
        let repo = SqliteReviewRepository::new(seed_venture("v-1").await);

        let assessment = ApplicationAssessment {
            tier_recommendation: Some("core".to_string()),
            probing_questions: vec!["Who buys first?".to_string()],
            jobs_impact: Some(JobsImpact {
                creative: 12,
                destructive: 2,
                net: 10,
                description: "New packing unit".to_string(),
            }),
            ..Default::default()
        };
        let first = ApplicationReview::triaged("r-1", 1000, "v-1", "csm-1", Role::SuccessManager, TriageOutcome::Prime, None, ApplicationAssessment::default());
        let second = ApplicationReview::triaged("r-2", 2000, "v-1", "csm-1", Role::SuccessManager, TriageOutcome::Core, Some("Bigger".to_string()), assessment);
        repo.insert(&first).await.unwrap();
        repo.insert(&second).await.unwrap();

        let latest = repo.find_latest_for_venture("v-1").await.unwrap().unwrap();
        assert_eq!(latest, second);
        assert!(repo.find_latest_for_venture("v-2").await.unwrap().is_none());
    }
}
