use super::*;

/// Parameter of `createAuction`.
#[derive(Debug, Serialize, SchemaType)]
pub struct CreateAuctionParams {
    /// The CIS-2 token to put under the hammer. The house pulls one unit of
    /// it into escrow, so the caller must have made the house an operator on
    /// the token contract.
    pub token:       Token,
    /// Length of the auction, counted from the first bid.
    pub duration:    Duration,
    /// The smallest acceptable first bid.
    pub reserve:     ContractTokenAmount,
    /// Optional curator gating the auction and earning `curator_fee` at
    /// settlement.
    pub curator:     Option<AccountAddress>,
    /// Share of the winning bid the curator keeps. Must be below 100%.
    pub curator_fee: Percentage,
    /// The CIS-2 token bids are placed in, or `None` to bid in CCD.
    pub currency:    Option<Token>,
}

/// Parameter of `setAuctionApproval`.
#[derive(Debug, Serialize, SchemaType)]
pub struct SetApprovalParams {
    pub auction:  AuctionId,
    pub approved: bool,
}

/// Parameter of `setAuctionReservePrice`.
#[derive(Debug, Serialize, SchemaType)]
pub struct SetReserveParams {
    pub auction: AuctionId,
    pub reserve: ContractTokenAmount,
}

/// Parameter of `createBid`. On a CCD auction the attached amount must equal
/// `amount`; on a token auction nothing may be attached and the house pulls
/// `amount` from the bidder.
#[derive(Debug, Serialize, SchemaType)]
pub struct BidParams {
    pub auction: AuctionId,
    pub amount:  ContractTokenAmount,
}

/// A live auction, as returned by the view entrypoints.
#[derive(Debug, Serialize, SchemaType, PartialEq, Eq)]
pub struct AuctionView {
    pub token:          Token,
    pub seller:         AccountAddress,
    pub duration:       Duration,
    pub reserve:        ContractTokenAmount,
    pub curator:        Option<AccountAddress>,
    pub curator_fee:    Percentage,
    pub currency:       Option<Token>,
    pub approved:       bool,
    pub first_bid_time: Option<Timestamp>,
    pub highest_bid:    Option<Bid>,
    /// Settlement opens at this time. `None` until the first bid.
    pub deadline:       Option<Timestamp>,
}

/// A stranded token, as returned by the view entrypoints.
#[derive(Debug, Serialize, SchemaType, PartialEq, Eq)]
pub struct GraveView {
    pub token: Token,
    pub heir:  AccountAddress,
}

/// What an auction id points at.
#[derive(Debug, Serialize, SchemaType, PartialEq, Eq)]
pub enum AuctionSlotView {
    Lot(AuctionView),
    Grave(GraveView),
}

/// Return value of `view`.
#[derive(Debug, Serialize, SchemaType, PartialEq, Eq)]
pub struct ViewState {
    /// The id the next auction will get.
    pub counter:  AuctionId,
    /// Every live auction and grave.
    pub auctions: Vec<(AuctionId, AuctionSlotView)>,
}

impl From<&AuctionData> for AuctionView {
    fn from(data: &AuctionData) -> Self {
        let deadline = data
            .first_bid_time
            .and_then(|first_bid_time| first_bid_time.checked_add(data.duration));
        AuctionView {
            token:          data.token.clone(),
            seller:         data.seller,
            duration:       data.duration,
            reserve:        data.reserve,
            curator:        data.curator,
            curator_fee:    data.curator_fee,
            currency:       data.currency.clone(),
            approved:       data.approved,
            first_bid_time: data.first_bid_time,
            highest_bid:    data.highest_bid,
            deadline,
        }
    }
}

impl From<&AuctionSlot> for AuctionSlotView {
    fn from(slot: &AuctionSlot) -> Self {
        match slot {
            AuctionSlot::Lot(data) => AuctionSlotView::Lot(data.into()),
            AuctionSlot::Grave(grave) => AuctionSlotView::Grave(GraveView {
                token: grave.token.clone(),
                heir:  grave.heir,
            }),
        }
    }
}
