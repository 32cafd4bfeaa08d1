use super::*;

/// Event log of the auction house. Every entry is tagged with the auction id
/// it concerns, so the full history of one auction can be filtered out of
/// the log.
#[derive(Debug, Serial, Deserial, PartialEq, Eq, SchemaType)]
#[concordium(repr(u8))]
pub enum AuctionEvent {
    /// A new auction was created and its token escrowed.
    #[concordium(tag = 0)]
    Created(CreatedEvent),
    /// The curator opened or closed bidding.
    #[concordium(tag = 1)]
    ApprovalUpdated(ApprovalUpdatedEvent),
    /// The reserve price moved before the first bid.
    #[concordium(tag = 2)]
    ReservePriceUpdated(ReservePriceUpdatedEvent),
    /// A bid became the standing bid.
    #[concordium(tag = 3)]
    Bid(BidEvent),
    /// A late bid pushed the deadline back.
    #[concordium(tag = 4)]
    Extended(ExtendedEvent),
    /// The auction settled. The token was delivered and the proceeds paid
    /// out.
    #[concordium(tag = 5)]
    Ended(EndedEvent),
    /// The auction was withdrawn before the first bid.
    #[concordium(tag = 6)]
    Canceled(CanceledEvent),
    /// The token contract refused to hand the token out. Any winner was
    /// refunded and the token was parked in a grave.
    #[concordium(tag = 7)]
    Aborted(AbortedEvent),
    /// A parked token left its grave.
    #[concordium(tag = 8)]
    Recovered(RecoveredEvent),
}

#[derive(Debug, Serialize, SchemaType, PartialEq, Eq)]
pub struct CreatedEvent {
    pub auction:     AuctionId,
    pub token:       Token,
    pub seller:      AccountAddress,
    pub duration:    Duration,
    pub reserve:     ContractTokenAmount,
    pub curator:     Option<AccountAddress>,
    pub curator_fee: Percentage,
    pub currency:    Option<Token>,
    /// Whether bidding opened right away.
    pub approved:    bool,
}

#[derive(Debug, Serialize, SchemaType, PartialEq, Eq)]
pub struct ApprovalUpdatedEvent {
    pub auction:  AuctionId,
    pub approved: bool,
}

#[derive(Debug, Serialize, SchemaType, PartialEq, Eq)]
pub struct ReservePriceUpdatedEvent {
    pub auction: AuctionId,
    pub reserve: ContractTokenAmount,
}

#[derive(Debug, Serialize, SchemaType, PartialEq, Eq)]
pub struct BidEvent {
    pub auction: AuctionId,
    pub bidder:  AccountAddress,
    pub amount:  ContractTokenAmount,
    /// This bid started the countdown.
    pub first:   bool,
}

#[derive(Debug, Serialize, SchemaType, PartialEq, Eq)]
pub struct ExtendedEvent {
    pub auction:  AuctionId,
    /// The new deadline.
    pub deadline: Timestamp,
}

#[derive(Debug, Serialize, SchemaType, PartialEq, Eq)]
pub struct EndedEvent {
    pub auction:       AuctionId,
    pub token:         Token,
    pub seller:        AccountAddress,
    pub winner:        AccountAddress,
    /// The winning bid.
    pub amount:        ContractTokenAmount,
    /// What the seller received after the curator cut.
    pub seller_share:  ContractTokenAmount,
    /// What the curator received. Zero when there is no curator or the cut
    /// could not be paid out.
    pub curator_share: ContractTokenAmount,
}

#[derive(Debug, Serialize, SchemaType, PartialEq, Eq)]
pub struct CanceledEvent {
    pub auction: AuctionId,
    pub token:   Token,
    pub seller:  AccountAddress,
}

#[derive(Debug, Serialize, SchemaType, PartialEq, Eq)]
pub struct AbortedEvent {
    pub auction:  AuctionId,
    pub token:    Token,
    /// The account that can recover the parked token.
    pub heir:     AccountAddress,
    /// The winning bid that was refunded, when the abort happened at
    /// settlement rather than at cancellation.
    pub refunded: Option<Bid>,
}

#[derive(Debug, Serialize, SchemaType, PartialEq, Eq)]
pub struct RecoveredEvent {
    pub auction: AuctionId,
    pub token:   Token,
    pub heir:    AccountAddress,
}
