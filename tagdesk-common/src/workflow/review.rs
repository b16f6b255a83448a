//! LLM output review walkthrough

use sqlx::SqlitePool;

use crate::db::models::{Direction, ReviewInput, ReviewPick, ReviewView, Step};
use crate::db::navigator::adjacent_id;
use crate::db::progress::{position_of, total};
use crate::db::selection;
use crate::db::store::fetch_input;
use crate::db::tables::REVIEW_INPUTS;
use crate::Result;

async fn view(pool: &SqlitePool, input: ReviewInput) -> Result<ReviewView> {
    let position = position_of(pool, &REVIEW_INPUTS, input.session_id, input.id).await?;
    let total = total(pool, &REVIEW_INPUTS, input.session_id).await?;

    Ok(ReviewView {
        id: input.id,
        session_id: input.session_id,
        input: input.input,
        original_output: input.original_output,
        curated_output: input.curated_output,
        status: input.status,
        position,
        total,
    })
}

/// First pending input (else first reviewed) with position and total
pub async fn next_for_review(pool: &SqlitePool, session_id: i64) -> Result<ReviewPick<ReviewView>> {
    match selection::next_for_review(pool, session_id).await? {
        ReviewPick::Found(input) => Ok(ReviewPick::Found(view(pool, input).await?)),
        ReviewPick::NoMoreItems => Ok(ReviewPick::NoMoreItems),
    }
}

/// A specific input of the session
pub async fn input_view(pool: &SqlitePool, session_id: i64, input_id: i64) -> Result<ReviewView> {
    REVIEW_INPUTS.ensure_parent_exists(pool, session_id).await?;
    let input = fetch_input(pool, session_id, input_id).await?;
    view(pool, input).await
}

/// The input before or after `from_id`, or `EndOfSequence`
pub async fn navigate(
    pool: &SqlitePool,
    session_id: i64,
    from_id: i64,
    direction: Direction,
) -> Result<Step<ReviewView>> {
    REVIEW_INPUTS.ensure_parent_exists(pool, session_id).await?;

    match adjacent_id(pool, &REVIEW_INPUTS, session_id, from_id, direction).await? {
        Step::Found(id) => {
            let input = fetch_input(pool, session_id, id).await?;
            Ok(Step::Found(view(pool, input).await?))
        }
        Step::EndOfSequence => Ok(Step::EndOfSequence),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init::init_memory_database;
    use crate::db::models::{ReviewPair, ReviewStatus};
    use crate::db::mutator::apply_curation;
    use crate::db::registry::create_session;
    use crate::db::store::insert_inputs;

    #[tokio::test]
    async fn test_review_walkthrough() {
        let pool = init_memory_database().await.unwrap();
        let session = create_session(&pool, "s", "nightly run").await.unwrap();
        let pairs = vec![
            ReviewPair { input: "2+2".into(), output: "5".into() },
            ReviewPair { input: "3+3".into(), output: "6".into() },
        ];
        insert_inputs(&pool, session, &pairs).await.unwrap();

        let first = next_for_review(&pool, session).await.unwrap().found().unwrap();
        assert_eq!((first.id, first.position, first.total), (1, 1, 2));
        assert_eq!(first.status, ReviewStatus::Pending);

        apply_curation(&pool, first.id, "4").await.unwrap();

        let second = next_for_review(&pool, session).await.unwrap().found().unwrap();
        assert_eq!((second.id, second.position), (2, 2));

        let back = navigate(&pool, session, second.id, Direction::Prev)
            .await
            .unwrap()
            .found()
            .unwrap();
        assert_eq!(back.curated_output.as_deref(), Some("4"));
        assert_eq!(back.status, ReviewStatus::Reviewed);

        assert_eq!(
            navigate(&pool, session, second.id, Direction::Next).await.unwrap(),
            Step::EndOfSequence
        );
    }

    #[tokio::test]
    async fn test_empty_session() {
        let pool = init_memory_database().await.unwrap();
        let session = create_session(&pool, "empty", "").await.unwrap();

        assert_eq!(next_for_review(&pool, session).await.unwrap(), ReviewPick::NoMoreItems);
        assert_eq!(
            navigate(&pool, session, 0, Direction::Next).await.unwrap(),
            Step::EndOfSequence
        );
    }
}
