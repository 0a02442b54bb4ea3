// Venture streams and their deliverable checklists

use super::{Ports, SessionContext};
use crate::domain::{
    apply_deliverable_status, DeliverableStatus, RagStatus, StreamDeliverable, StreamSelfStatus,
    SupportType, VentureStream,
};
use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamWithDeliverables {
    #[serde(flatten)]
    pub stream: VentureStream,
    pub deliverables: Vec<StreamDeliverable>,
}

/// Partial update; absent fields keep their value
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamUpdate {
    pub owner_name: Option<String>,
    pub target_quarter: Option<String>,
    pub end_deliverable: Option<String>,
    pub self_status: Option<StreamSelfStatus>,
    pub support_type: Option<SupportType>,
    pub support_type_other: Option<String>,
    pub rag_status: Option<RagStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamUpdateOutcome {
    pub stream: VentureStream,
    pub overall_rag: Option<RagStatus>,
}

pub async fn list(ports: &Ports, ctx: &SessionContext, venture_id: &str) -> Result<Vec<StreamWithDeliverables>> {
    ports.visible_venture(ctx, venture_id).await?;

    let streams = ports.streams.list_for_venture(venture_id).await?;
    let mut out = Vec::with_capacity(streams.len());
    for stream in streams {
        let deliverables = ports.streams.list_deliverables(&stream.id).await?;
        out.push(StreamWithDeliverables { stream, deliverables });
    }
    Ok(out)
}

async fn load_stream(ports: &Ports, ctx: &SessionContext, stream_id: &str) -> Result<VentureStream> {
    let stream = ports
        .streams
        .find_by_id(stream_id)
        .await?
        .ok_or_else(|| AppError::not_found("Stream", stream_id))?;
    ports.visible_venture(ctx, &stream.venture_id).await?;
    Ok(stream)
}

pub async fn update_stream(
    ports: &Ports,
    ctx: &SessionContext,
    stream_id: &str,
    update: StreamUpdate,
) -> Result<StreamUpdateOutcome> {
    let mut stream = load_stream(ports, ctx, stream_id).await?;
    let now = ports.clock.now_millis();

    if let Some(owner) = update.owner_name {
        stream.owner_name = Some(owner);
    }
    if let Some(quarter) = update.target_quarter {
        stream.target_quarter = Some(quarter);
    }
    if let Some(deliverable) = update.end_deliverable {
        stream.end_deliverable = Some(deliverable);
    }
    if update.self_status.is_some()
        || update.support_type.is_some()
        || update.support_type_other.is_some()
    {
        let self_status = update.self_status.or(stream.self_status).ok_or_else(|| {
            AppError::Validation("A support type needs a self status".to_string())
        })?;
        let support_type = update.support_type.or(stream.support_type);
        let other = update.support_type_other.or_else(|| stream.support_type_other.clone());
        stream.assess(self_status, support_type, other);
    }

    let rag_changed = update.rag_status.is_some() && update.rag_status != stream.rag_status;
    if update.rag_status.is_some() {
        stream.rag_status = update.rag_status;
    }
    stream.updated_at = now;
    ports.streams.update(&stream).await?;

    let mut venture = ports.load_venture(&stream.venture_id).await?;
    if rag_changed {
        let streams = ports.streams.list_for_venture(&venture.id).await?;
        let overall = RagStatus::overall(streams.iter().map(|s| s.rag_status));
        if overall != venture.overall_rag {
            venture.overall_rag = overall;
            venture.updated_at = now;
            ports.ventures.update(&venture).await?;
            info!(venture_id = %venture.id, overall_rag = ?overall, "Overall RAG changed");
        }
    }

    debug!(stream_id = %stream.id, "Stream updated");
    Ok(StreamUpdateOutcome {
        stream,
        overall_rag: venture.overall_rag,
    })
}

/// Set a deliverable's status; returns the rows that changed
pub async fn update_deliverable(
    ports: &Ports,
    ctx: &SessionContext,
    deliverable_id: &str,
    status: DeliverableStatus,
) -> Result<Vec<StreamDeliverable>> {
    let deliverable = ports
        .streams
        .find_deliverable(deliverable_id)
        .await?
        .ok_or_else(|| AppError::not_found("Deliverable", deliverable_id))?;
    load_stream(ports, ctx, &deliverable.stream_id).await?;

    let mut checklist = ports.streams.list_deliverables(&deliverable.stream_id).await?;
    let changed = apply_deliverable_status(&mut checklist, deliverable_id, status, ports.clock.now_millis())?;
    for row in &changed {
        ports.streams.update_deliverable(row).await?;
    }

    debug!(deliverable_id, status = %status, changed = changed.len(), "Deliverable updated");
    Ok(changed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::{TestBackend, T0};
    use crate::domain::{Role, StreamDefinition, Venture, VentureStatus};
    use std::sync::Arc;

    fn active_venture(backend: &Arc<TestBackend>) {
        let mut venture = Venture::new("v-1", T0, "e-1");
        venture.status = VentureStatus::Active;
        backend.put_venture(&venture);
        let streams: Vec<VentureStream> = (1..=2)
            .map(|n| VentureStream::new(format!("s-{}", n), T0, "v-1", StreamDefinition::by_number(n).unwrap()))
            .collect();
        backend.put_streams(&streams);
        let items: Vec<StreamDeliverable> = (1..=3)
            .map(|seq| StreamDeliverable::new(format!("d-{}", seq), T0, "s-1", seq, "x"))
            .collect();
        backend.deliverables.lock().unwrap().extend(items);
    }

    fn rag(status: RagStatus) -> StreamUpdate {
        StreamUpdate {
            rag_status: Some(status),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_rag_change_recomputes_overall() {
        let backend = TestBackend::new();
        let ports = backend.ports();
        let owner = backend.login("e-1", Role::Entrepreneur);
        active_venture(&backend);

        let out = update_stream(&ports, &owner, "s-1", rag(RagStatus::Red)).await.unwrap();
        assert_eq!(out.overall_rag, Some(RagStatus::Red));

        update_stream(&ports, &owner, "s-1", rag(RagStatus::Complete)).await.unwrap();
        assert_eq!(backend.venture("v-1").overall_rag, Some(RagStatus::Green));

        update_stream(&ports, &owner, "s-2", rag(RagStatus::Complete)).await.unwrap();
        assert_eq!(backend.venture("v-1").overall_rag, Some(RagStatus::Complete));
    }

    #[tokio::test]
    async fn test_support_type_cleared_when_not_need_help() {
        let backend = TestBackend::new();
        let ports = backend.ports();
        let vp = backend.login("vp-1", Role::VenturePartner);
        active_venture(&backend);

        let update = StreamUpdate {
            self_status: Some(StreamSelfStatus::OnIt),
            support_type: Some(SupportType::Do),
            owner_name: Some("Meera".to_string()),
            ..Default::default()
        };
        let out = update_stream(&ports, &vp, "s-1", update).await.unwrap();
        assert_eq!(out.stream.support_type, None);
        assert_eq!(out.stream.owner_name.as_deref(), Some("Meera"));
    }

    #[tokio::test]
    async fn test_support_type_other_alone_is_applied() {
        let backend = TestBackend::new();
        let ports = backend.ports();
        let owner = backend.login("e-1", Role::Entrepreneur);
        active_venture(&backend);

        let first = StreamUpdate {
            self_status: Some(StreamSelfStatus::NeedHelp),
            support_type: Some(SupportType::Other),
            support_type_other: Some("Export licences".to_string()),
            ..Default::default()
        };
        update_stream(&ports, &owner, "s-1", first).await.unwrap();

        let reworded = StreamUpdate {
            support_type_other: Some("Export licences and customs".to_string()),
            ..Default::default()
        };
        let out = update_stream(&ports, &owner, "s-1", reworded).await.unwrap();
        assert_eq!(out.stream.support_type, Some(SupportType::Other));
        assert_eq!(out.stream.support_type_other.as_deref(), Some("Export licences and customs"));
    }

    #[tokio::test]
    async fn test_other_entrepreneur_cannot_update() {
        let backend = TestBackend::new();
        let stranger = backend.login("e-2", Role::Entrepreneur);
        active_venture(&backend);

        let err = update_stream(&backend.ports(), &stranger, "s-1", rag(RagStatus::Red))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_completing_current_moves_marker() {
        let backend = TestBackend::new();
        let ports = backend.ports();
        let owner = backend.login("e-1", Role::Entrepreneur);
        active_venture(&backend);

        let changed = update_deliverable(&ports, &owner, "d-1", DeliverableStatus::Completed)
            .await
            .unwrap();
        assert_eq!(changed.len(), 2);

        let listed = list(&ports, &owner, "v-1").await.unwrap();
        let current: Vec<&str> = listed[0]
            .deliverables
            .iter()
            .filter(|d| d.is_current)
            .map(|d| d.id.as_str())
            .collect();
        assert_eq!(current, vec!["d-2"]);
    }
}
