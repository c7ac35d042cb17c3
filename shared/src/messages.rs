//! Text notices the server sends inside text frames

/// Sentinel after which both ends close the connection
pub const GAME_OVER: &str = "Game Over!";
/// Sent to a connection refused at admission
pub const SERVER_OVERLOADED: &str = "server-overloaded";

pub const GAME_STARTING: &str = "Game Starting!";
pub const WAITING_FOR_OPPONENT: &str = "Waiting for other player!";
pub const YOUR_TURN: &str = "Your turn!";
pub const CORRECT: &str = "Correct!";
pub const INCORRECT: &str = "Incorrect!";
pub const YOU_WIN: &str = "You Win!";
pub const YOU_LOSE: &str = "You Lose!";
pub const OPPONENT_DISCONNECTED: &str = "Opponent disconnected!";
/// Sent before the sentinel when a game is ended for inactivity
pub const TIMED_OUT: &str = "Timed out waiting for a guess!";

pub const ALREADY_GUESSED: &str = "Letter has already been guessed!";
pub const NOT_YOUR_TURN: &str = "Not your turn!";
pub const INVALID_MODE: &str = "Invalid multiplayer mode.";
pub const INVALID_DATA: &str = "Client sent invalid data!";

/// "Waiting on Player {n}..." for the player who is not about to guess
pub fn waiting_on_player(number: u8) -> String {
    format!("Waiting on Player {}...", number)
}
