//! Seat-index arithmetic. Seats are indices into the player list, which is
//! also the turn order. Every helper requires `player_count > 0`.

pub const fn next_seat(seat: usize, player_count: usize) -> usize {
    debug_assert!(player_count > 0);
    (seat + 1) % player_count
}

/// Seat that led the trick currently on the table.
///
/// `turn` is the seat to act next; it has already advanced once per card on
/// the table, so the leader sits `plays_on_table` seats behind it. With a
/// full table this lands back on `turn` itself.
pub const fn trick_leader_seat(turn: usize, plays_on_table: usize, player_count: usize) -> usize {
    debug_assert!(player_count > 0);
    (turn + player_count - plays_on_table % player_count) % player_count
}

/// Seat of the `index`-th play of a trick led from `leader`.
pub const fn seat_of_play(leader: usize, index: usize, player_count: usize) -> usize {
    debug_assert!(player_count > 0);
    (leader + index) % player_count
}
