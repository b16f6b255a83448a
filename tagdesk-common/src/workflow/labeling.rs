//! Dataset labeling walkthrough

use sqlx::SqlitePool;

use crate::db::models::{Dataset, Direction, LabelItem, LabelingView, Step};
use crate::db::navigator::adjacent_id;
use crate::db::progress::{position_of, total};
use crate::db::registry::get_dataset;
use crate::db::selection::first_for_labeling;
use crate::db::store::fetch_item;
use crate::db::tables::LABEL_ITEMS;
use crate::Result;

async fn view(pool: &SqlitePool, dataset: Dataset, item: LabelItem) -> Result<LabelingView> {
    let position = position_of(pool, &LABEL_ITEMS, dataset.id, item.id).await?;
    let total = total(pool, &LABEL_ITEMS, dataset.id).await?;

    Ok(LabelingView {
        status: item.status(),
        all_keys: item.all_keys(),
        id: item.id,
        dataset_id: item.dataset_id,
        content: item.content,
        label: item.label,
        label_options: dataset.label_options,
        position,
        total,
    })
}

/// First item of the dataset with position and total
pub async fn next_for_labeling(pool: &SqlitePool, dataset_id: i64) -> Result<LabelingView> {
    let dataset = get_dataset(pool, dataset_id).await?;
    let item = first_for_labeling(pool, dataset_id).await?;
    view(pool, dataset, item).await
}

/// A specific item of the dataset
pub async fn item_view(pool: &SqlitePool, dataset_id: i64, item_id: i64) -> Result<LabelingView> {
    let dataset = get_dataset(pool, dataset_id).await?;
    let item = fetch_item(pool, dataset_id, item_id).await?;
    view(pool, dataset, item).await
}

/// The item before or after `from_id`, or `EndOfSequence`
pub async fn navigate(
    pool: &SqlitePool,
    dataset_id: i64,
    from_id: i64,
    direction: Direction,
) -> Result<Step<LabelingView>> {
    let dataset = get_dataset(pool, dataset_id).await?;

    match adjacent_id(pool, &LABEL_ITEMS, dataset_id, from_id, direction).await? {
        Step::Found(id) => {
            let item = fetch_item(pool, dataset_id, id).await?;
            Ok(Step::Found(view(pool, dataset, item).await?))
        }
        Step::EndOfSequence => Ok(Step::EndOfSequence),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init::init_memory_database;
    use crate::db::models::{ItemStatus, Progress};
    use crate::db::mutator::apply_label;
    use crate::db::progress::progress;
    use crate::db::registry::create_dataset_with_items;
    use crate::Error;
    use serde_json::json;

    #[tokio::test]
    async fn test_fruits_walkthrough() {
        let pool = init_memory_database().await.unwrap();
        let (dataset_id, inserted) = create_dataset_with_items(
            &pool,
            "fruits",
            vec!["apple".into(), "banana".into()],
            &[json!({"name": "a"}), json!({"name": "b"}), json!({"name": "c"})],
        )
        .await
        .unwrap();
        assert_eq!(inserted, 3);

        let first = next_for_labeling(&pool, dataset_id).await.unwrap();
        assert_eq!((first.id, first.position, first.total), (1, 1, 3));
        assert_eq!(first.label_options, vec!["apple", "banana"]);
        assert_eq!(first.all_keys, vec!["name"]);
        assert_eq!(first.status, ItemStatus::Pending);

        apply_label(&pool, first.id, "apple").await.unwrap();

        let second = navigate(&pool, dataset_id, first.id, Direction::Next)
            .await
            .unwrap()
            .found()
            .unwrap();
        assert_eq!((second.id, second.position), (2, 2));

        assert_eq!(
            progress(&pool, &LABEL_ITEMS, dataset_id).await.unwrap(),
            Progress { total: 3, completed: 1 }
        );

        let back = navigate(&pool, dataset_id, second.id, Direction::Prev)
            .await
            .unwrap()
            .found()
            .unwrap();
        assert_eq!(back.label.as_deref(), Some("apple"));
        assert_eq!(back.status, ItemStatus::Completed);
    }

    #[tokio::test]
    async fn test_navigate_past_ends() {
        let pool = init_memory_database().await.unwrap();
        let (dataset_id, _) = create_dataset_with_items(
            &pool,
            "d",
            vec!["x".into()],
            &[json!({"n": 1}), json!({"n": 2})],
        )
        .await
        .unwrap();

        assert_eq!(
            navigate(&pool, dataset_id, 2, Direction::Next).await.unwrap(),
            Step::EndOfSequence
        );
        assert_eq!(
            navigate(&pool, dataset_id, 1, Direction::Prev).await.unwrap(),
            Step::EndOfSequence
        );
        assert!(matches!(
            navigate(&pool, dataset_id + 1, 1, Direction::Next).await,
            Err(Error::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_item_view_position() {
        let pool = init_memory_database().await.unwrap();
        let (dataset_id, _) = create_dataset_with_items(
            &pool,
            "d",
            vec!["x".into()],
            &[json!({"n": 1}), json!({"n": 2}), json!({"n": 3})],
        )
        .await
        .unwrap();

        let view = item_view(&pool, dataset_id, 3).await.unwrap();
        assert_eq!((view.position, view.total), (3, 3));
        assert!(matches!(item_view(&pool, dataset_id, 4).await, Err(Error::NotFound(_))));
    }
}
