use crate::error::{ErrorCode, ScheduleError};

const INF: u32 = u32::MAX / 2;

/// Build one day's start-arm sequence for a single animal.
///
/// `start_arms` are the arms the animal may start from (every maze arm
/// except its exit arm), `hint` is the last start arm of the previous day.
///
/// The returned sequence never repeats an arm three times in a row, keeps
/// the two arms' usage counts as balanced as the trial count allows, and
/// among balanced sequences has the minimal number of adjacent switches,
/// counting the hint-to-first-trial transition when a hint is present.
/// Remaining ties resolve to the lexicographically smallest sequence, so
/// the builder is fully deterministic and seed-independent.
pub fn build_trial_sequence(
    start_arms: &[u8],
    trials: usize,
    hint: Option<u8>,
) -> Result<Vec<u8>, ScheduleError> {
    if trials == 0 {
        return Ok(Vec::new());
    }
    match start_arms {
        [] => Err(ScheduleError {
            code: ErrorCode::InfeasibleSequence,
            message: "No start arm is available".to_string(),
        }),
        [arm] if trials < 3 => Ok(vec![*arm; trials]),
        [arm] => Err(ScheduleError {
            code: ErrorCode::InfeasibleSequence,
            message: format!(
                "A single start arm ({arm}) cannot fill {trials} trials without a triple repeat"
            ),
        }),
        &[a, b] => solve_two_arms(a.min(b), a.max(b), trials, hint),
        _ => Err(ScheduleError {
            code: ErrorCode::InvalidInput,
            message: format!("Expected at most two start arms, got {}", start_arms.len()),
        }),
    }
}

/// Dynamic program over (position, previous arm, run length, remaining
/// low-arm budget). Transitions that would create a run of three are
/// pruned as infeasible; a switch costs 1, staying costs 0.
fn solve_two_arms(
    low: u8,
    high: u8,
    trials: usize,
    hint: Option<u8>,
) -> Result<Vec<u8>, ScheduleError> {
    let arms = [low, high];
    let width = trials + 1;
    // g[(i, last, run, remaining_low)] = minimal switches over positions
    // i..trials, given the arm at i-1 and its current run length.
    let idx =
        |i: usize, last: usize, run: usize, remaining: usize| -> usize {
            ((i * 2 + last) * 2 + (run - 1)) * width + remaining
        };
    let mut g = vec![INF; (trials + 1) * 2 * 2 * width];
    for last in 0..2 {
        for run in 1..=2 {
            g[idx(trials, last, run, 0)] = 0;
        }
    }
    for i in (1..trials).rev() {
        for last in 0..2 {
            for run in 1..=2 {
                for remaining in 0..=trials {
                    let mut best = INF;
                    for (next, step, next_run) in transitions(last, run, remaining) {
                        let tail = g[idx(i + 1, next, next_run, remaining - usize::from(next == 0))];
                        if tail < INF {
                            best = best.min(step + tail);
                        }
                    }
                    g[idx(i, last, run, remaining)] = best;
                }
            }
        }
    }

    let entry_cost = |first: usize| -> u32 {
        match hint {
            Some(h) if arms[first] != h => 1,
            _ => 0,
        }
    };
    // Total cost when exactly `k` trials use the lower arm.
    let plan_cost = |k: usize| -> u32 {
        let mut best = INF;
        for first in 0..2 {
            if first == 0 && k == 0 {
                continue;
            }
            let tail = g[idx(1, first, 1, k - usize::from(first == 0))];
            if tail < INF {
                best = best.min(entry_cost(first) + tail);
            }
        }
        best
    };

    // Balance outranks switch count; both outrank the lexicographic
    // preference applied during reconstruction.
    let costs: Vec<u32> = (0..=trials).map(plan_cost).collect();
    let goal = (0..=trials)
        .filter(|&k| costs[k] < INF)
        .map(|k| ((2 * k).abs_diff(trials), costs[k]))
        .min()
        .ok_or_else(|| ScheduleError {
            code: ErrorCode::Internal,
            message: format!("No {trials}-trial sequence over arms {low}/{high} exists"),
        })?;

    let mut best_seq: Option<Vec<u8>> = None;
    for k in 0..=trials {
        if costs[k] < INF && ((2 * k).abs_diff(trials), costs[k]) == goal {
            let seq = reconstruct(&arms, trials, hint, k, goal.1, &g, idx)?;
            if best_seq.as_ref().is_none_or(|b| seq < *b) {
                best_seq = Some(seq);
            }
        }
    }
    best_seq.ok_or_else(|| ScheduleError {
        code: ErrorCode::Internal,
        message: "Sequence reconstruction failed".to_string(),
    })
}

/// Legal moves out of (previous arm, run length) with `remaining` uses of
/// the lower arm left: (chosen arm index, switch cost, new run length).
fn transitions(last: usize, run: usize, remaining: usize) -> Vec<(usize, u32, usize)> {
    let mut moves = Vec::with_capacity(2);
    for next in 0..2 {
        if next == 0 && remaining == 0 {
            continue;
        }
        if next == last {
            if run == 2 {
                continue;
            }
            moves.push((next, 0, run + 1));
        } else {
            moves.push((next, 1, 1));
        }
    }
    moves
}

/// Walk forward through the suffix table, always taking the lower arm
/// when an optimal completion still exists.
fn reconstruct(
    arms: &[u8; 2],
    trials: usize,
    hint: Option<u8>,
    k: usize,
    total_cost: u32,
    g: &[u32],
    idx: impl Fn(usize, usize, usize, usize) -> usize,
) -> Result<Vec<u8>, ScheduleError> {
    let dead_end = || ScheduleError {
        code: ErrorCode::Internal,
        message: "Sequence reconstruction failed".to_string(),
    };
    let entry_cost = |first: usize| -> u32 {
        match hint {
            Some(h) if arms[first] != h => 1,
            _ => 0,
        }
    };

    let mut seq = Vec::with_capacity(trials);
    let mut state = None;
    for first in 0..2 {
        if first == 0 && k == 0 {
            continue;
        }
        let remaining = k - usize::from(first == 0);
        let tail = g[idx(1, first, 1, remaining)];
        if tail < INF && entry_cost(first) + tail == total_cost {
            seq.push(arms[first]);
            state = Some((first, 1, remaining, entry_cost(first)));
            break;
        }
    }
    let (mut last, mut run, mut remaining, mut spent) = state.ok_or_else(dead_end)?;

    for i in 1..trials {
        let mut advanced = false;
        for (next, step, next_run) in transitions(last, run, remaining) {
            let next_remaining = remaining - usize::from(next == 0);
            let tail = g[idx(i + 1, next, next_run, next_remaining)];
            if tail < INF && spent + step + tail == total_cost {
                seq.push(arms[next]);
                last = next;
                run = next_run;
                remaining = next_remaining;
                spent += step;
                advanced = true;
                break;
            }
        }
        if !advanced {
            return Err(dead_end());
        }
    }
    Ok(seq)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn switches(seq: &[u8], hint: Option<u8>) -> usize {
        let mut count = 0;
        if let (Some(h), Some(&first)) = (hint, seq.first()) {
            if first != h {
                count += 1;
            }
        }
        count + seq.windows(2).filter(|w| w[0] != w[1]).count()
    }

    fn has_triple(seq: &[u8]) -> bool {
        seq.windows(3).any(|w| w[0] == w[1] && w[1] == w[2])
    }

    #[test]
    fn test_four_trials_no_hint() {
        let seq = build_trial_sequence(&[2, 3], 4, None).unwrap();
        assert_eq!(seq, vec![2, 2, 3, 3]);
        assert_eq!(switches(&seq, None), 1);
    }

    #[test]
    fn test_hint_pulls_sequence_toward_previous_day() {
        let seq = build_trial_sequence(&[2, 3], 4, Some(3)).unwrap();
        assert_eq!(seq, vec![3, 3, 2, 2]);
        assert_eq!(switches(&seq, Some(3)), 1);
    }

    #[test]
    fn test_single_trial() {
        assert_eq!(build_trial_sequence(&[1, 3], 1, None).unwrap(), vec![1]);
        assert_eq!(build_trial_sequence(&[1, 3], 1, Some(3)).unwrap(), vec![3]);
    }

    #[test]
    fn test_balance_and_no_triples_even_count() {
        let seq = build_trial_sequence(&[1, 3], 10, None).unwrap();
        assert_eq!(seq.len(), 10);
        assert!(seq.iter().all(|arm| [1, 3].contains(arm)));
        assert!(!has_triple(&seq));
        let ones = seq.iter().filter(|&&arm| arm == 1).count();
        assert_eq!(ones, 5);
        // 5/5 over runs of at most two means at least six runs.
        assert_eq!(switches(&seq, None), 5);
    }

    #[test]
    fn test_balance_within_one_odd_count() {
        let seq = build_trial_sequence(&[1, 2], 25, None).unwrap();
        assert!(!has_triple(&seq));
        let ones = seq.iter().filter(|&&arm| arm == 1).count();
        assert_eq!(ones.abs_diff(25 - ones), 1);
    }

    #[test]
    fn test_unsorted_arms_are_normalized() {
        let seq = build_trial_sequence(&[3, 1], 4, None).unwrap();
        assert_eq!(seq, vec![1, 1, 3, 3]);
    }

    #[test]
    fn test_single_arm_short_day_is_fine() {
        assert_eq!(build_trial_sequence(&[2], 2, None).unwrap(), vec![2, 2]);
    }

    #[test]
    fn test_single_arm_three_trials_is_infeasible() {
        let err = build_trial_sequence(&[2], 3, None).unwrap_err();
        assert_eq!(err.code, ErrorCode::InfeasibleSequence);
    }

    #[test]
    fn test_no_arms_is_infeasible() {
        let err = build_trial_sequence(&[], 1, None).unwrap_err();
        assert_eq!(err.code, ErrorCode::InfeasibleSequence);
    }

    #[test]
    fn test_builder_is_deterministic() {
        let a = build_trial_sequence(&[1, 2], 17, Some(2)).unwrap();
        let b = build_trial_sequence(&[1, 2], 17, Some(2)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_odd_count_prefers_lexicographically_smaller_split() {
        // Both 3/2 and 2/3 splits reach the same switch count; the 3/2
        // split starting with the lower arm wins.
        let seq = build_trial_sequence(&[1, 2], 5, None).unwrap();
        assert_eq!(seq, vec![1, 1, 2, 2, 1]);
    }
}
