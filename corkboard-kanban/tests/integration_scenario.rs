//! End-to-end ordering scenarios through the processor

use corkboard_kanban::{
    board::InitBoard,
    card::{AddCard, DeleteCard, MoveCard},
    column::AddColumn,
    types::{CardId, ColumnId},
    CapabilitySet, Collection, KanbanContext, KanbanOperationProcessor, KanbanSession,
    OperationProcessor, PatchEntry,
};
use tempfile::TempDir;

async fn setup() -> (TempDir, KanbanSession, KanbanOperationProcessor) {
    let temp = TempDir::new().unwrap();
    let ctx = KanbanContext::new(temp.path().join("board"));
    let session = KanbanSession::new(ctx, "alice", CapabilitySet::all());
    let processor = KanbanOperationProcessor::new();
    processor
        .process(&InitBoard::new("Scenario"), &session)
        .await
        .unwrap();
    (temp, session, processor)
}

async fn sequence(session: &KanbanSession, column: &ColumnId) -> Vec<CardId> {
    session.ctx().read_column(column).await.unwrap().sequence
}

#[test_log::test(tokio::test)]
async fn test_three_column_scenario() {
    let (_temp, session, processor) = setup().await;
    let initial = session.ctx().read_board().await.unwrap().sequence;
    assert_eq!(initial.len(), 3);
    let (c1, c2) = (initial[0].clone(), initial[1].clone());

    // New column at the head
    let batch = processor
        .process(&AddColumn::new("T"), &session)
        .await
        .unwrap();
    let c4 = ColumnId::from(batch.entries()[1].id());
    let board = session.ctx().read_board().await.unwrap();
    let mut expected = vec![c4];
    expected.extend(initial.iter().cloned());
    assert_eq!(board.sequence, expected);

    // X at head, then Y after X
    let batch = processor
        .process(&AddCard::new(c1.clone(), "X"), &session)
        .await
        .unwrap();
    let x = CardId::from(batch.entries()[1].id());
    let batch = processor
        .process(&AddCard::new(c1.clone(), "Y").after(x.clone()), &session)
        .await
        .unwrap();
    let y = CardId::from(batch.entries()[1].id());
    assert_eq!(sequence(&session, &c1).await, vec![x.clone(), y.clone()]);

    // Move X to the head of C2
    let batch = processor
        .process(&MoveCard::to_column(x.clone(), c2.clone()), &session)
        .await
        .unwrap();
    assert_eq!(sequence(&session, &c1).await, vec![y]);
    assert_eq!(sequence(&session, &c2).await, vec![x.clone()]);
    assert_eq!(session.ctx().read_card(&x).await.unwrap().column_id, c2);

    // Source strictly before target, then the card
    let ids: Vec<_> = batch.iter().map(|e| e.id().to_string()).collect();
    assert_eq!(ids, vec![c1.to_string(), c2.to_string(), x.to_string()]);
}

#[tokio::test]
async fn test_delete_leaves_no_trace() {
    let (_temp, session, processor) = setup().await;
    let c1 = session.ctx().read_board().await.unwrap().sequence[0].clone();
    let batch = processor
        .process(&AddCard::new(c1.clone(), "Doomed"), &session)
        .await
        .unwrap();
    let id = CardId::from(batch.entries()[1].id());

    let batch = processor
        .process(&DeleteCard::new(id.clone()), &session)
        .await
        .unwrap();

    assert_eq!(batch.entries()[0].collection(), Collection::Columns);
    match &batch.entries()[0] {
        PatchEntry::Columns { fields, .. } => {
            assert_eq!(fields.sequence.as_deref(), Some(&[][..]));
        }
        other => panic!("unexpected entry {:?}", other),
    }
    let board = session.ctx().read_board().await.unwrap();
    for column in session.ctx().read_columns(&board).await.unwrap() {
        assert!(!column.contains(&id));
    }
    assert!(session.ctx().read_card(&id).await.is_err());
}

#[tokio::test]
async fn test_batches_serialize_sequences_in_full() {
    let (_temp, session, processor) = setup().await;
    let c1 = session.ctx().read_board().await.unwrap().sequence[0].clone();
    let mut ids = Vec::new();
    for title in ["a", "b", "c"] {
        let batch = processor
            .process(&AddCard::new(c1.clone(), title), &session)
            .await
            .unwrap();
        ids.push(batch.entries()[1].id().to_string());
    }

    let batch = processor
        .process(&MoveCard::to_column(ids[0].as_str(), c1.clone()), &session)
        .await
        .unwrap();
    let json = serde_json::to_value(&batch).unwrap();
    // c, b, a -> a, c, b
    assert_eq!(
        json[0]["fields"]["sequence"],
        format!("{},{},{}", ids[0], ids[2], ids[1])
    );
}
