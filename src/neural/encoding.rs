//! Board featurization.
//!
//! A position is encoded relative to the player to move: plane 0 holds the
//! mover's pieces, plane 1 the opponent's, plane 2 is a constant plane with
//! the mover's colour. That way the networks never have to learn two
//! colour-specific copies of every pattern.

use tch::{Device, Tensor};

use crate::game::Game;

/// Input planes per position.
pub const CHANNELS: i64 = 3;

/// Encode a raw board snapshot as a `[1, 3, rows, cols]` float tensor.
pub fn encode_position(
    board: &[i8],
    player: i8,
    shape: (usize, usize),
    device: Device,
) -> Tensor {
    let (rows, cols) = shape;
    let mut planes = vec![0.0f32; CHANNELS as usize * rows * cols];
    let plane = rows * cols;
    for (i, &cell) in board.iter().enumerate() {
        if cell == player {
            planes[i] = 1.0;
        } else if cell == -player {
            planes[plane + i] = 1.0;
        }
    }
    for slot in &mut planes[2 * plane..] {
        *slot = f32::from(player);
    }
    Tensor::from_slice(&planes)
        .view([1, CHANNELS, rows as i64, cols as i64])
        .to_device(device)
}

/// Encode the current position of a live game.
pub fn encode_state<G: Game>(state: &G, device: Device) -> Tensor {
    encode_position(
        &state.board(),
        state.current_player(),
        state.board_shape(),
        device,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::OthelloGame;

    #[test]
    fn planes_are_mover_relative() {
        let game = OthelloGame::new();
        let tensor = encode_state(&game, Device::Cpu);
        assert_eq!(tensor.size(), vec![1, 3, 8, 8]);

        // Mover is -1, whose pieces sit at (3,3) and (4,4).
        assert_eq!(tensor.double_value(&[0, 0, 3, 3]), 1.0);
        assert_eq!(tensor.double_value(&[0, 0, 4, 4]), 1.0);
        assert_eq!(tensor.double_value(&[0, 1, 3, 4]), 1.0);
        assert_eq!(tensor.double_value(&[0, 1, 4, 3]), 1.0);
        assert_eq!(tensor.double_value(&[0, 2, 0, 0]), -1.0);
    }

    #[test]
    fn both_piece_planes_are_disjoint() {
        let game = OthelloGame::new();
        let tensor = encode_state(&game, Device::Cpu);
        let overlap = (tensor.get(0).get(0) * tensor.get(0).get(1))
            .sum(tch::Kind::Float)
            .double_value(&[]);
        assert_eq!(overlap, 0.0);
    }
}
