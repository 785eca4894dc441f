//! Running conversation context.
//!
//! The running context is the token sequence the model produced on the last
//! exchange (prompt + reply). It is the only conversational memory the model
//! sees; it lives in process memory and is lost on restart.

/// Encoded dialogue history carried between exchanges.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunningContext {
    ids: Vec<u32>,
}

impl RunningContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> &[u32] {
        &self.ids
    }

    /// Build the model input for the next exchange.
    ///
    /// Layout: `seed ++ context ++ turn`. `seed` is only used for the first
    /// exchange of a process when the transcript is configured to prime the
    /// model; otherwise pass `None`.
    pub fn build_input(&self, seed: Option<&[u32]>, turn: &[u32]) -> Vec<u32> {
        let seed = seed.unwrap_or_default();
        let mut input = Vec::with_capacity(seed.len() + self.ids.len() + turn.len());
        input.extend_from_slice(seed);
        input.extend_from_slice(&self.ids);
        input.extend_from_slice(turn);
        input
    }

    /// Replace the context with the sequence produced by the model.
    pub fn replace(&mut self, ids: Vec<u32>) {
        self.ids = ids;
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }
}

/// Trim `ids` from the front so at most `window` tokens remain.
///
/// When tokens are dropped, the kept slice is advanced past the first
/// end-of-sequence marker so it starts on a turn boundary, unless that
/// marker closes the final turn.
pub fn fit_window(ids: Vec<u32>, window: usize, eos: u32) -> Vec<u32> {
    if ids.len() <= window {
        return ids;
    }

    let kept = &ids[ids.len() - window..];
    let boundary = kept[..kept.len().saturating_sub(1)]
        .iter()
        .position(|&id| id == eos);

    match boundary {
        Some(pos) => kept[pos + 1..].to_vec(),
        None => kept.to_vec(),
    }
}

/// Tokens available to the prompt once `reserve` positions are kept for the
/// reply. Never less than one.
pub fn prompt_window(max_context_len: usize, reserve: usize) -> usize {
    max_context_len.saturating_sub(reserve).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EOS: u32 = 0;

    #[test]
    fn test_build_input_concatenates_context_and_turn() {
        let mut ctx = RunningContext::new();
        assert_eq!(ctx.build_input(None, &[5, 6, EOS]), vec![5, 6, EOS]);

        ctx.replace(vec![1, 2, EOS, 3, EOS]);
        assert_eq!(
            ctx.build_input(None, &[7, EOS]),
            vec![1, 2, EOS, 3, EOS, 7, EOS]
        );
    }

    #[test]
    fn test_build_input_with_seed() {
        let mut ctx = RunningContext::new();
        ctx.replace(vec![4, EOS]);
        assert_eq!(
            ctx.build_input(Some(&[9, EOS]), &[7, EOS]),
            vec![9, EOS, 4, EOS, 7, EOS]
        );
    }

    #[test]
    fn test_clear_empties_context() {
        let mut ctx = RunningContext::new();
        ctx.replace(vec![1, 2, 3]);
        assert_eq!(ctx.len(), 3);
        ctx.clear();
        assert!(ctx.is_empty());
    }

    #[test]
    fn test_fit_window_noop_when_short() {
        assert_eq!(fit_window(vec![1, 2, EOS], 8, EOS), vec![1, 2, EOS]);
    }

    #[test]
    fn test_fit_window_cuts_at_turn_boundary() {
        // turns: [1 2 EOS] [3 4 EOS] [5 EOS]
        let ids = vec![1, 2, EOS, 3, 4, EOS, 5, EOS];
        // last 6 = [EOS 3 4 EOS 5 EOS] -> advance past first EOS
        assert_eq!(fit_window(ids.clone(), 6, EOS), vec![3, 4, EOS, 5, EOS]);
        // last 5 = [3 4 EOS 5 EOS] -> first EOS at index 2
        assert_eq!(fit_window(ids, 5, EOS), vec![5, EOS]);
    }

    #[test]
    fn test_fit_window_keeps_oversized_final_turn() {
        let ids = vec![1, 2, 3, 4, 5, EOS];
        assert_eq!(fit_window(ids, 3, EOS), vec![4, 5, EOS]);
    }

    #[test]
    fn test_prompt_window_floor() {
        assert_eq!(prompt_window(1024, 64), 960);
        assert_eq!(prompt_window(32, 64), 1);
    }
}
