pub mod models;

pub use models::*;

/// Bets that fall inside `range`, in their original order.  Pending bets
/// are always kept; settled bets are kept when their settlement time is
/// inside the window.  A settled bet missing its settlement time is kept so
/// that validation downstream can reject it.
pub(crate) fn within_range<'a>(
    bets: &'a [Bet],
    range: &'a DateRange,
) -> impl Iterator<Item = &'a Bet> + 'a {
    bets.iter().filter(move |bet| match (bet.status, bet.settled_at) {
        (BetStatus::Pending, _) => true,
        (_, Some(settled_at)) => range.contains(settled_at),
        (_, None) => true,
    })
}
