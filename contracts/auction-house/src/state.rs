use super::*;

/// A standing bid. The funds behind it are held by the house until the bid
/// is outbid, the auction settles or the token delivery fails.
#[derive(Debug, Clone, Copy, Serialize, SchemaType, PartialEq, Eq)]
pub struct Bid {
    /// The account that placed the bid.
    pub bidder: AccountAddress,
    /// Amount in micro CCD, or in the auction currency.
    pub amount: ContractTokenAmount,
}

/// A live auction. The token it names is held in escrow by the house.
#[derive(Debug, Serialize, Clone, SchemaType)]
pub struct AuctionData {
    /// The escrowed token under the hammer.
    pub token: Token,
    /// The account that created the auction and receives the proceeds.
    pub seller: AccountAddress,
    /// Length of the auction, counted from the first bid.
    pub duration: Duration,
    /// The smallest acceptable first bid.
    pub reserve: ContractTokenAmount,
    /// Optional account gating the auction and earning `curator_fee` of the
    /// winning bid at settlement.
    pub curator: Option<AccountAddress>,
    /// Share of the winning bid the curator keeps.
    pub curator_fee: Percentage,
    /// The CIS-2 token bids are placed in, or `None` for CCD.
    pub currency: Option<Token>,
    /// Whether bidding is open. Auctions without a curator, or curated by
    /// the seller themselves, start out approved.
    pub approved: bool,
    /// Time of the first bid. Fixes the deadline together with `duration`.
    pub first_bid_time: Option<Timestamp>,
    /// The standing bid.
    pub highest_bid: Option<Bid>,
}

/// A token stranded in the house after its contract refused to transfer it
/// back out. Only `heir` can recover it.
#[derive(Debug, Serialize, Clone, SchemaType)]
pub struct GraveData {
    pub token: Token,
    pub heir:  AccountAddress,
}

/// What an auction id currently points at.
#[derive(Debug, Serialize, Clone, SchemaType)]
pub enum AuctionSlot {
    /// A live auction.
    Lot(AuctionData),
    /// A stranded token waiting for `recover`.
    Grave(GraveData),
}

/// A CIS-2 deposit the house is waiting for. Armed right before the house
/// pulls tokens towards itself and consumed by the transfer hook during the
/// pull, which ties every escrowed token and collected bid to an actual
/// incoming transfer.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct Deposit {
    /// The token expected to arrive. Its contract must be the hook caller.
    pub token:  Token,
    /// The owner the tokens are pulled from.
    pub from:   Address,
    pub amount: ContractTokenAmount,
}

/// Result of recording a bid. The caller still has to collect the amount on
/// the token rail and refund the outbid.
#[must_use]
pub struct BidOutcome {
    /// The bid that was just outbid and must be refunded.
    pub refund:   Option<Bid>,
    /// This was the first bid, starting the countdown.
    pub first:    bool,
    /// The new deadline, when the bid stretched the auction.
    pub extended: Option<Timestamp>,
}

/// Result of closing an auction. The record is gone; the caller must deliver
/// the token and pay out the winning bid.
#[must_use]
pub struct Settlement {
    pub token:       Token,
    pub seller:      AccountAddress,
    pub curator:     Option<AccountAddress>,
    pub curator_fee: Percentage,
    pub currency:    Option<Token>,
    pub winning_bid: Bid,
}

/// Result of cancelling an auction. The record is gone; the caller must hand
/// the token back to the seller.
#[must_use]
pub struct Cancellation {
    pub token:  Token,
    pub seller: AccountAddress,
}

/// Auction house state.
///
/// State changes of a failed call are rolled back by the chain, so methods
/// here are free to remove a record first and bail on a later check.
#[derive(Serial, DeserialWithState)]
#[concordium(state_parameter = "S")]
pub struct State<S = StateApi> {
    /// Auction book, keyed by id. Settled and cancelled auctions are
    /// removed; aborted ones leave a grave behind under the same id.
    pub auctions:         StateMap<AuctionId, AuctionSlot, S>,
    /// Id of the next auction.
    pub counter:          AuctionId,
    /// The deposit the house is currently waiting for. At most one is armed
    /// at a time and it never outlives the call that armed it.
    expected_deposit:     Option<Deposit>,
}

impl State {
    pub fn empty(state_builder: &mut StateBuilder) -> Self {
        State {
            auctions:         state_builder.new_map(),
            counter:          0,
            expected_deposit: None,
        }
    }

    /// Registers a new auction under the next id.
    pub fn create(&mut self, data: AuctionData) -> AuctionId {
        let auction = self.counter;
        self.counter += 1;
        let _ = self.auctions.insert(auction, AuctionSlot::Lot(data));
        auction
    }

    /// The bidding currency of a live auction.
    pub fn currency_of(&self, auction: AuctionId) -> Result<Option<Token>, ContractError> {
        let slot = self
            .auctions
            .get(&auction)
            .ok_or(CustomContractError::NoSuchAuction)?;
        match &*slot {
            AuctionSlot::Lot(lot) => Ok(lot.currency.clone()),
            AuctionSlot::Grave(_) => bail!(CustomContractError::NoSuchAuction.into()),
        }
    }

    /// Opens or closes bidding. Only the curator, only before the first bid.
    pub fn set_approval(
        &mut self,
        auction: AuctionId,
        sender: &Address,
        approved: bool,
    ) -> Result<(), ContractError> {
        let mut slot = self
            .auctions
            .get_mut(&auction)
            .ok_or(CustomContractError::NoSuchAuction)?;
        let lot = match &mut *slot {
            AuctionSlot::Lot(lot) => lot,
            AuctionSlot::Grave(_) => bail!(CustomContractError::NoSuchAuction.into()),
        };
        let curator = lot.curator.map(Address::Account);
        ensure!(Some(*sender) == curator, CustomContractError::Unauthorized.into());
        ensure!(lot.first_bid_time.is_none(), CustomContractError::AuctionStarted.into());
        lot.approved = approved;
        Ok(())
    }

    /// Moves the reserve price. Seller or curator, only before the first bid.
    pub fn set_reserve(
        &mut self,
        auction: AuctionId,
        sender: &Address,
        reserve: ContractTokenAmount,
    ) -> Result<(), ContractError> {
        let mut slot = self
            .auctions
            .get_mut(&auction)
            .ok_or(CustomContractError::NoSuchAuction)?;
        let lot = match &mut *slot {
            AuctionSlot::Lot(lot) => lot,
            AuctionSlot::Grave(_) => bail!(CustomContractError::NoSuchAuction.into()),
        };
        let seller = Address::Account(lot.seller);
        let curator = lot.curator.map(Address::Account);
        ensure!(
            *sender == seller || Some(*sender) == curator,
            CustomContractError::Unauthorized.into()
        );
        ensure!(lot.first_bid_time.is_none(), CustomContractError::AuctionStarted.into());
        lot.reserve = reserve;
        Ok(())
    }

    /// Records a bid as the new standing bid.
    ///
    /// The first bid must meet the reserve and starts the countdown. Later
    /// bids must beat the standing bid by the minimum increment and arrive
    /// before the deadline. A bid inside the time buffer stretches the
    /// auction so the remaining window is the full buffer again.
    pub fn bid(
        &mut self,
        auction: AuctionId,
        bidder: AccountAddress,
        amount: ContractTokenAmount,
        now: Timestamp,
    ) -> Result<BidOutcome, ContractError> {
        let mut slot = self
            .auctions
            .get_mut(&auction)
            .ok_or(CustomContractError::NoSuchAuction)?;
        let lot = match &mut *slot {
            AuctionSlot::Lot(lot) => lot,
            AuctionSlot::Grave(_) => bail!(CustomContractError::NoSuchAuction.into()),
        };
        ensure!(lot.approved, CustomContractError::NotApproved.into());
        if let Some(first_bid_time) = lot.first_bid_time {
            let deadline = first_bid_time
                .timestamp_millis()
                .checked_add(lot.duration.millis())
                .ok_or(CustomContractError::InvalidDuration)?;
            ensure!(
                now.timestamp_millis() < deadline,
                CustomContractError::AuctionExpired.into()
            );
        }
        match &lot.highest_bid {
            None => ensure!(amount >= lot.reserve, CustomContractError::ReserveNotMet.into()),
            Some(standing) => {
                let floor = standing.amount + MIN_BID_INCREMENT * standing.amount;
                ensure!(amount >= floor, CustomContractError::BidTooLow.into());
            }
        }

        let first = lot.first_bid_time.is_none();
        if first {
            lot.first_bid_time = Some(now);
        }
        let refund = lot.highest_bid.replace(Bid { bidder, amount });

        // The buffer applies to every bid, including a first bid on an
        // auction shorter than the buffer.
        let first_bid_millis = lot.first_bid_time.unwrap_or(now).timestamp_millis();
        let deadline = first_bid_millis
            .checked_add(lot.duration.millis())
            .ok_or(CustomContractError::InvalidDuration)?;
        let now_millis = now.timestamp_millis();
        let extended = if deadline - now_millis < TIME_BUFFER_MILLIS {
            let stretched = now_millis + TIME_BUFFER_MILLIS;
            lot.duration = Duration::from_millis(stretched - first_bid_millis);
            Some(Timestamp::from_timestamp_millis(stretched))
        } else {
            None
        };

        Ok(BidOutcome { refund, first, extended })
    }

    /// Closes an expired auction and removes its record.
    pub fn settle(
        &mut self,
        auction: AuctionId,
        now: Timestamp,
    ) -> Result<Settlement, ContractError> {
        let data = match self.auctions.remove_and_get(&auction) {
            Some(AuctionSlot::Lot(lot)) => lot,
            _ => bail!(CustomContractError::NoSuchAuction.into()),
        };
        let first_bid_time = match data.first_bid_time {
            Some(first_bid_time) => first_bid_time,
            None => bail!(CustomContractError::AuctionNotStarted.into()),
        };
        let winning_bid = match data.highest_bid {
            Some(winning_bid) => winning_bid,
            None => bail!(CustomContractError::AuctionNotStarted.into()),
        };
        let deadline = first_bid_time
            .timestamp_millis()
            .checked_add(data.duration.millis())
            .ok_or(CustomContractError::InvalidDuration)?;
        ensure!(
            now.timestamp_millis() >= deadline,
            CustomContractError::AuctionStillActive.into()
        );
        Ok(Settlement {
            token:       data.token,
            seller:      data.seller,
            curator:     data.curator,
            curator_fee: data.curator_fee,
            currency:    data.currency,
            winning_bid,
        })
    }

    /// Withdraws an auction nobody has bid on yet and removes its record.
    /// Seller or curator only.
    pub fn cancel(
        &mut self,
        auction: AuctionId,
        sender: &Address,
    ) -> Result<Cancellation, ContractError> {
        let data = match self.auctions.remove_and_get(&auction) {
            Some(AuctionSlot::Lot(lot)) => lot,
            _ => bail!(CustomContractError::NoSuchAuction.into()),
        };
        let seller = Address::Account(data.seller);
        let curator = data.curator.map(Address::Account);
        ensure!(
            *sender == seller || Some(*sender) == curator,
            CustomContractError::Unauthorized.into()
        );
        ensure!(data.first_bid_time.is_none(), CustomContractError::AuctionStarted.into());
        Ok(Cancellation { token: data.token, seller: data.seller })
    }

    /// Parks a token that could not be transferred out, under the id of the
    /// auction it was escrowed for.
    pub fn bury(&mut self, auction: AuctionId, token: Token, heir: AccountAddress) {
        let _ = self.auctions.insert(auction, AuctionSlot::Grave(GraveData { token, heir }));
    }

    /// Removes a grave for recovery. Heir only. A failed transfer afterwards
    /// rolls the grave back into place.
    pub fn recover(
        &mut self,
        auction: AuctionId,
        sender: &Address,
    ) -> Result<GraveData, ContractError> {
        let grave = match self.auctions.remove_and_get(&auction) {
            Some(AuctionSlot::Grave(grave)) => grave,
            _ => bail!(CustomContractError::NoSuchAuction.into()),
        };
        ensure!(
            *sender == Address::Account(grave.heir),
            CustomContractError::Unauthorized.into()
        );
        Ok(grave)
    }

    /// Arms the transfer hook right before the house pulls a deposit.
    pub fn expect_deposit(&mut self, deposit: Deposit) {
        self.expected_deposit = Some(deposit);
    }

    /// Consumes the armed expectation. `None` when the hook is called
    /// without the house having asked for a deposit.
    pub fn take_expected_deposit(&mut self) -> Option<Deposit> {
        self.expected_deposit.take()
    }

    /// True while a pull the hook has not confirmed yet is in flight.
    pub fn deposit_pending(&self) -> bool {
        self.expected_deposit.is_some()
    }
}
