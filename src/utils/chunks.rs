use crate::error::{PerfError, Result};

pub const DEFAULT_CHUNK_SIZE: usize = 100;

/// Split `items` into consecutive chunks of `size` (the last may be shorter).
pub fn chunk<T: Clone>(items: &[T], size: usize) -> Result<Vec<Vec<T>>> {
    if size == 0 {
        return Err(PerfError::ZeroChunkSize);
    }
    Ok(items.chunks(size).map(<[T]>::to_vec).collect())
}

/// Map `items` through `processor` a chunk at a time, yielding to the
/// runtime between chunks so long batches don't starve other tasks.
/// Output order matches input order.
pub async fn process_in_chunks<T, R, F>(
    items: Vec<T>,
    mut processor: F,
    chunk_size: usize,
) -> Result<Vec<R>>
where
    F: FnMut(T) -> R,
{
    if chunk_size == 0 {
        return Err(PerfError::ZeroChunkSize);
    }

    let mut results = Vec::with_capacity(items.len());
    let mut remaining = items.into_iter().peekable();
    while remaining.peek().is_some() {
        results.extend(remaining.by_ref().take(chunk_size).map(&mut processor));
        tokio::task::yield_now().await;
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_chunk_holds_the_remainder() {
        let chunks = chunk(&[1, 2, 3, 4, 5], 2).unwrap();
        assert_eq!(chunks, vec![vec![1, 2], vec![3, 4], vec![5]]);
        assert!(chunk::<u8>(&[], 3).unwrap().is_empty());
    }

    #[test]
    fn zero_size_is_an_error() {
        assert!(matches!(chunk(&[1], 0), Err(PerfError::ZeroChunkSize)));
    }

    #[tokio::test]
    async fn processes_every_item_in_order() {
        let input: Vec<u32> = (0..250).collect();
        let mut batches = 0;
        let out = process_in_chunks(
            input,
            |v| {
                if v % DEFAULT_CHUNK_SIZE as u32 == 0 {
                    batches += 1;
                }
                v * 2
            },
            DEFAULT_CHUNK_SIZE,
        )
        .await
        .unwrap();

        assert_eq!(out.len(), 250);
        assert_eq!(out[0], 0);
        assert_eq!(out[249], 498);
        assert_eq!(batches, 3);
    }

    #[tokio::test]
    async fn zero_chunk_size_is_rejected_before_work() {
        let result = process_in_chunks(vec![1], |v: i32| v, 0).await;
        assert!(result.is_err());
    }
}
