//! Published REBA lookup tables A, B and C.
//!
//! The mappings are not linear, so they are stored verbatim. Every lookup has
//! two flavours: `*_checked` returns `None` for keys outside the table domain,
//! the plain variant clamps each key to the nearest defined edge.

use log::debug;

/// Table A, indexed `[trunk - 1][neck - 1][leg - 1]`.
pub const TABLE_A: [[[u8; 4]; 3]; 5] = [
    // trunk 1
    [[1, 2, 3, 4], [1, 2, 3, 4], [3, 3, 5, 6]],
    // trunk 2
    [[2, 3, 4, 5], [3, 4, 5, 6], [4, 5, 6, 7]],
    // trunk 3
    [[2, 4, 5, 6], [4, 5, 6, 7], [5, 6, 7, 8]],
    // trunk 4
    [[3, 5, 6, 7], [5, 6, 7, 8], [6, 7, 8, 9]],
    // trunk 5
    [[4, 6, 7, 8], [6, 7, 8, 9], [7, 8, 9, 9]],
];

/// Table B, indexed `[upper_arm - 1][forearm - 1][wrist - 1]`.
pub const TABLE_B: [[[u8; 3]; 2]; 6] = [
    [[1, 2, 2], [1, 2, 3]],
    [[1, 2, 3], [2, 3, 4]],
    [[3, 4, 5], [4, 5, 5]],
    [[4, 5, 5], [5, 6, 7]],
    [[6, 7, 8], [7, 8, 8]],
    [[7, 8, 8], [8, 9, 9]],
];

/// Table C, indexed `[score_a - 1][score_b - 1]`.
pub const TABLE_C: [[u8; 12]; 12] = [
    [1, 1, 1, 2, 3, 3, 4, 5, 6, 7, 7, 7],
    [1, 2, 2, 3, 4, 4, 5, 6, 6, 7, 7, 8],
    [2, 3, 3, 3, 4, 5, 6, 7, 7, 8, 8, 8],
    [3, 4, 4, 4, 5, 6, 7, 8, 8, 9, 9, 9],
    [4, 4, 4, 5, 6, 7, 8, 8, 9, 9, 9, 9],
    [6, 6, 6, 7, 8, 8, 9, 9, 10, 10, 10, 10],
    [7, 7, 7, 8, 9, 9, 9, 10, 10, 11, 11, 11],
    [8, 8, 8, 9, 10, 10, 10, 10, 10, 11, 11, 11],
    [9, 9, 9, 10, 10, 10, 11, 11, 11, 12, 12, 12],
    [10, 10, 10, 11, 11, 11, 11, 12, 12, 12, 12, 12],
    [11, 11, 11, 11, 12, 12, 12, 12, 12, 12, 12, 12],
    [12, 12, 12, 12, 12, 12, 12, 12, 12, 12, 12, 12],
];

/// Zero-based index for a 1-based key, if `1 <= key <= len`.
#[inline]
fn index(key: u8, len: usize) -> Option<usize> {
    let k = usize::from(key);
    (1..=len).contains(&k).then(|| k - 1)
}

/// Zero-based index for a 1-based key clamped into `1..=len`.
fn clamped_index(table: &str, axis: &str, key: u8, len: usize) -> usize {
    index(key, len).unwrap_or_else(|| {
        let edge = usize::from(key).clamp(1, len);
        debug!("table {table}: {axis}={key} outside 1..={len}, clamped to {edge}");
        edge - 1
    })
}

pub fn table_a_checked(trunk: u8, neck: u8, leg: u8) -> Option<u8> {
    Some(TABLE_A[index(trunk, 5)?][index(neck, 3)?][index(leg, 4)?])
}

/// Table A with clamped keys (trunk 1–5, neck 1–3, leg 1–4).
pub fn table_a(trunk: u8, neck: u8, leg: u8) -> u8 {
    TABLE_A[clamped_index("A", "trunk", trunk, 5)][clamped_index("A", "neck", neck, 3)]
        [clamped_index("A", "leg", leg, 4)]
}

pub fn table_b_checked(upper_arm: u8, forearm: u8, wrist: u8) -> Option<u8> {
    Some(TABLE_B[index(upper_arm, 6)?][index(forearm, 2)?][index(wrist, 3)?])
}

/// Table B with clamped keys (upper arm 1–6, forearm 1–2, wrist 1–3).
pub fn table_b(upper_arm: u8, forearm: u8, wrist: u8) -> u8 {
    TABLE_B[clamped_index("B", "upper_arm", upper_arm, 6)]
        [clamped_index("B", "forearm", forearm, 2)][clamped_index("B", "wrist", wrist, 3)]
}

pub fn table_c_checked(score_a: u8, score_b: u8) -> Option<u8> {
    Some(TABLE_C[index(score_a, 12)?][index(score_b, 12)?])
}

/// Table C with both scores clamped into `1..=12`.
pub fn table_c(score_a: u8, score_b: u8) -> u8 {
    TABLE_C[clamped_index("C", "score_a", score_a, 12)][clamped_index("C", "score_b", score_b, 12)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_a_is_total_over_its_domain() {
        for trunk in 1..=5 {
            for neck in 1..=3 {
                for leg in 1..=4 {
                    let v = table_a_checked(trunk, neck, leg).expect("defined");
                    assert!((1..=9).contains(&v));
                    assert_eq!(v, table_a(trunk, neck, leg));
                }
            }
        }
    }

    #[test]
    fn table_b_is_total_over_its_domain() {
        for upper in 1..=6 {
            for fore in 1..=2 {
                for wrist in 1..=3 {
                    let v = table_b_checked(upper, fore, wrist).expect("defined");
                    assert!((1..=9).contains(&v));
                    assert_eq!(v, table_b(upper, fore, wrist));
                }
            }
        }
    }

    #[test]
    fn published_corner_values() {
        assert_eq!(table_a(1, 1, 1), 1);
        assert_eq!(table_a(5, 3, 4), 9);
        assert_eq!(table_a(1, 3, 1), 3);
        assert_eq!(table_b(1, 1, 1), 1);
        assert_eq!(table_b(6, 2, 3), 9);
        assert_eq!(table_c(1, 1), 1);
        assert_eq!(table_c(12, 12), 12);
        assert_eq!(table_c(6, 9), 10);
    }

    #[test]
    fn tables_are_monotone_along_every_axis() {
        for (t, by_neck) in TABLE_A.iter().enumerate() {
            for (n, row) in by_neck.iter().enumerate() {
                assert!(row.windows(2).all(|w| w[0] <= w[1]));
                if t > 0 {
                    assert!(row.iter().zip(TABLE_A[t - 1][n]).all(|(a, b)| *a >= b));
                }
            }
        }
        for row in TABLE_C {
            assert!(row.windows(2).all(|w| w[0] <= w[1]));
        }
        for col in 0..12 {
            assert!((1..12).all(|r| TABLE_C[r][col] >= TABLE_C[r - 1][col]));
        }
    }

    #[test]
    fn out_of_range_keys_clamp_to_edges() {
        assert_eq!(table_a_checked(6, 1, 1), None);
        assert_eq!(table_a(0, 0, 0), table_a(1, 1, 1));
        assert_eq!(table_a(9, 9, 9), table_a(5, 3, 4));
        assert_eq!(table_b_checked(7, 1, 1), None);
        assert_eq!(table_b(200, 3, 0), table_b(6, 2, 1));
        assert_eq!(table_c_checked(13, 1), None);
        assert_eq!(table_c(14, 0), TABLE_C[11][0]);
        assert_eq!(table_c(255, 255), 12);
    }
}
