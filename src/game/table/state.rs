use super::*;

/// The per-user projection of a table. Carries every public field and only
/// the requesting user's own hole cards; opponents' cards surface solely
/// through Showdown events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicTableState {
    pub table_id: String,
    pub owner_user_id: String,
    pub phase: GamePhase,
    pub lifecycle: TableLifecycle,
    pub hand_number: u64,
    pub community_cards: Vec<Card>,
    pub pot_total: i64,
    pub current_bet: i64,
    pub min_raise_to: i64,
    pub small_blind: i64,
    pub big_blind: i64,
    pub max_seats: usize,
    pub dealer_seat: Option<usize>,
    pub current_turn_seat: Option<usize>,
    pub turn_deadline_ms: Option<u64>,
    pub players: Vec<PublicPlayerState>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicPlayerState {
    pub user_id: String,
    pub seat: usize,
    pub stack: i64,
    pub committed_this_round: i64,
    pub committed_this_hand: i64,
    pub state: PlayerState,
    pub role: PlayerRole,
    pub has_acted_this_round: bool,
    /// Present only for the requesting user
    pub hole_cards: Option<Vec<Card>>,
}

impl PokerTable {
    pub fn public_state(&self, for_user_id: Option<&str>) -> PublicTableState {
        PublicTableState {
            table_id: self.table_id.clone(),
            owner_user_id: self.owner_user_id.clone(),
            phase: self.phase,
            lifecycle: self.lifecycle,
            hand_number: self.hand_number,
            community_cards: self.community_cards.clone(),
            pot_total: self.pot_total(),
            current_bet: self.current_bet,
            min_raise_to: self.min_raise_to(),
            small_blind: self.small_blind,
            big_blind: self.big_blind,
            max_seats: self.max_seats,
            dealer_seat: if self.hand_number > 0 {
                Some(self.dealer_seat)
            } else {
                None
            },
            current_turn_seat: self.current_turn_seat,
            turn_deadline_ms: self.turn_deadline_ms,
            players: self
                .players
                .iter()
                .map(|p| PublicPlayerState {
                    user_id: p.user_id.clone(),
                    seat: p.seat,
                    stack: p.stack,
                    committed_this_round: p.committed_this_round,
                    committed_this_hand: p.committed_this_hand,
                    state: p.state,
                    role: p.role,
                    has_acted_this_round: p.has_acted_this_round,
                    hole_cards: if Some(p.user_id.as_str()) == for_user_id
                        && !p.hole_cards.is_empty()
                    {
                        Some(p.hole_cards.clone())
                    } else {
                        None
                    },
                })
                .collect(),
        }
    }
}
