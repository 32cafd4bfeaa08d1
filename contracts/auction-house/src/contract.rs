use super::*;

/// Creates the auction house with an empty auction book.
#[init(contract = "auction_house", event = "AuctionEvent")]
fn contract_init(_ctx: &InitContext, state_builder: &mut StateBuilder) -> InitResult<State> {
    Ok(State::empty(state_builder))
}

/// Asks a contract through the CIS-0 `supports` query whether it implements
/// CIS-2. Anything short of a clean yes, including a contract that cannot
/// answer the query at all, counts as no.
fn confirms_cis2(host: &Host<State>, contract: &ContractAddress) -> bool {
    let query = SupportsQueryParams {
        queries: vec![CIS2_STANDARD_IDENTIFIER.to_owned()],
    };
    let response = host.invoke_contract_read_only(
        contract,
        &query,
        EntrypointName::new_unchecked("supports"),
        Amount::zero(),
    );
    let mut return_value = match response {
        Ok(Some(return_value)) => return_value,
        _ => return false,
    };
    let response: SupportsQueryResponse = match return_value.get() {
        Ok(response) => response,
        Err(_) => return false,
    };
    matches!(response.results.first(), Some(SupportResult::Support))
}

/// Invokes a CIS-2 transfer on the contract of `token`.
fn transfer_token(
    host: &mut Host<State>,
    token: &Token,
    from: Address,
    to: Receiver,
    amount: ContractTokenAmount,
) -> ContractResult<()> {
    let parameter = TransferParameter::from(vec![Transfer {
        token_id: token.id.clone(),
        amount,
        from,
        to,
        data: AdditionalData::empty(),
    }]);
    host.invoke_contract(
        &token.contract,
        &parameter,
        EntrypointName::new_unchecked("transfer"),
        Amount::zero(),
    )?;
    Ok(())
}

/// Pulls `amount` of `token` from `from` into the house and checks through
/// the transfer hook that the tokens actually arrived. A token contract that
/// reports success without delivering fails the pull.
fn pull_deposit(
    ctx: &ReceiveContext,
    host: &mut Host<State>,
    token: &Token,
    from: Address,
    amount: ContractTokenAmount,
) -> ContractResult<()> {
    host.state_mut().expect_deposit(Deposit {
        token: token.clone(),
        from,
        amount,
    });
    let to = Receiver::Contract(
        ctx.self_address(),
        OwnedEntrypointName::new_unchecked("onReceivingCIS2".to_string()),
    );
    transfer_token(host, token, from, to, amount)?;
    ensure!(
        !host.state().deposit_pending(),
        CustomContractError::MissingDeposit.into()
    );
    Ok(())
}

/// Pays `amount` to the account `to`, in CCD or in the auction currency.
fn pay_out(
    ctx: &ReceiveContext,
    host: &mut Host<State>,
    currency: &Option<Token>,
    to: &AccountAddress,
    amount: ContractTokenAmount,
) -> ContractResult<()> {
    match currency {
        None => host.invoke_transfer(to, Amount::from_micro_ccd(amount.0))?,
        Some(token) => transfer_token(
            host,
            token,
            Address::Contract(ctx.self_address()),
            Receiver::Account(*to),
            amount,
        )?,
    }
    Ok(())
}

/// Puts a token under the hammer and returns the id of the new auction. The
/// caller becomes the seller; the token moves into escrow here, so the
/// caller must have made the house an operator on the token contract.
///
/// Auctions without a curator, or curated by the seller themselves, open for
/// bidding right away. Any other auction stays closed until the curator
/// calls `setAuctionApproval`.
#[receive(
    contract = "auction_house",
    name = "createAuction",
    parameter = "CreateAuctionParams",
    return_value = "AuctionId",
    error = "ContractError",
    enable_logger,
    mutable
)]
fn contract_create_auction(
    ctx: &ReceiveContext,
    host: &mut Host<State>,
    logger: &mut impl HasLogger,
) -> ContractResult<AuctionId> {
    let seller = match ctx.sender() {
        Address::Account(account) => account,
        Address::Contract(_) => bail!(CustomContractError::OnlyAccountAddress.into()),
    };
    let params: CreateAuctionParams = ctx.parameter_cursor().get()?;
    ensure!(
        params.curator_fee < Percentage::from_percent(100),
        CustomContractError::InvalidFee.into()
    );
    ensure!(
        params.duration.millis() > 0,
        CustomContractError::InvalidDuration.into()
    );
    ensure!(
        confirms_cis2(host, &params.token.contract),
        CustomContractError::NotCis2.into()
    );

    // The seller curating their own auction needs no separate approval.
    let approved = match params.curator {
        None => true,
        Some(curator) => curator == seller,
    };
    let data = AuctionData {
        token: params.token.clone(),
        seller,
        duration: params.duration,
        reserve: params.reserve,
        curator: params.curator,
        curator_fee: params.curator_fee,
        currency: params.currency.clone(),
        approved,
        first_bid_time: None,
        highest_bid: None,
    };
    let auction = host.state_mut().create(data);

    // Escrow. A token that does not arrive rolls the record back.
    pull_deposit(ctx, host, &params.token, Address::Account(seller), TokenAmountU64(1))?;

    logger.log(&AuctionEvent::Created(CreatedEvent {
        auction,
        token: params.token,
        seller,
        duration: params.duration,
        reserve: params.reserve,
        curator: params.curator,
        curator_fee: params.curator_fee,
        currency: params.currency,
        approved,
    }))?;
    Ok(auction)
}

/// Opens or closes bidding on a curated auction. Curator only, and only
/// before the first bid.
#[receive(
    contract = "auction_house",
    name = "setAuctionApproval",
    parameter = "SetApprovalParams",
    error = "ContractError",
    enable_logger,
    mutable
)]
fn contract_set_auction_approval(
    ctx: &ReceiveContext,
    host: &mut Host<State>,
    logger: &mut impl HasLogger,
) -> ContractResult<()> {
    let params: SetApprovalParams = ctx.parameter_cursor().get()?;
    let sender = ctx.sender();
    host.state_mut().set_approval(params.auction, &sender, params.approved)?;
    logger.log(&AuctionEvent::ApprovalUpdated(ApprovalUpdatedEvent {
        auction: params.auction,
        approved: params.approved,
    }))?;
    Ok(())
}

/// Moves the reserve price of an auction nobody has bid on yet. Seller or
/// curator only.
#[receive(
    contract = "auction_house",
    name = "setAuctionReservePrice",
    parameter = "SetReserveParams",
    error = "ContractError",
    enable_logger,
    mutable
)]
fn contract_set_auction_reserve_price(
    ctx: &ReceiveContext,
    host: &mut Host<State>,
    logger: &mut impl HasLogger,
) -> ContractResult<()> {
    let params: SetReserveParams = ctx.parameter_cursor().get()?;
    let sender = ctx.sender();
    host.state_mut().set_reserve(params.auction, &sender, params.reserve)?;
    logger.log(&AuctionEvent::ReservePriceUpdated(ReservePriceUpdatedEvent {
        auction: params.auction,
        reserve: params.reserve,
    }))?;
    Ok(())
}

/// Places a bid. Bidders must be accounts. On a CCD auction the attached
/// amount must equal the bid; on a token auction nothing may be attached and
/// the house pulls the bid from the bidder, who must have made the house an
/// operator on the currency contract.
///
/// The outbid standing bid is refunded in the same call. A bid landing
/// within the time buffer of the deadline stretches the auction.
#[receive(
    contract = "auction_house",
    name = "createBid",
    parameter = "BidParams",
    error = "ContractError",
    enable_logger,
    mutable,
    payable
)]
fn contract_create_bid(
    ctx: &ReceiveContext,
    host: &mut Host<State>,
    amount: Amount,
    logger: &mut impl HasLogger,
) -> ContractResult<()> {
    let bidder = match ctx.sender() {
        Address::Account(account) => account,
        Address::Contract(_) => bail!(CustomContractError::OnlyAccountAddress.into()),
    };
    let params: BidParams = ctx.parameter_cursor().get()?;
    let now = ctx.metadata().slot_time();

    let currency = host.state().currency_of(params.auction)?;
    match &currency {
        None => ensure!(
            amount == Amount::from_micro_ccd(params.amount.0),
            CustomContractError::AmountMismatch.into()
        ),
        Some(_) => ensure!(
            amount == Amount::zero(),
            CustomContractError::AmountMismatch.into()
        ),
    }

    let outcome = host.state_mut().bid(params.auction, bidder, params.amount, now)?;

    if let Some(token) = &currency {
        pull_deposit(ctx, host, token, Address::Account(bidder), params.amount)?;
    }
    if let Some(outbid) = outcome.refund {
        pay_out(ctx, host, &currency, &outbid.bidder, outbid.amount)?;
    }

    logger.log(&AuctionEvent::Bid(BidEvent {
        auction: params.auction,
        bidder,
        amount: params.amount,
        first: outcome.first,
    }))?;
    if let Some(deadline) = outcome.extended {
        logger.log(&AuctionEvent::Extended(ExtendedEvent {
            auction: params.auction,
            deadline,
        }))?;
    }
    Ok(())
}

/// Settles an expired auction. Callable by anyone once the deadline has
/// passed.
///
/// The token goes to the winner, the curator cut is paid and the seller
/// receives the remainder. A curator cut that cannot be paid out folds back
/// into the seller's share instead of blocking settlement. If the token
/// contract refuses the delivery itself, the winner is refunded and the
/// token is parked in a grave for the seller to `recover`.
#[receive(
    contract = "auction_house",
    name = "endAuction",
    parameter = "AuctionId",
    error = "ContractError",
    enable_logger,
    mutable
)]
fn contract_end_auction(
    ctx: &ReceiveContext,
    host: &mut Host<State>,
    logger: &mut impl HasLogger,
) -> ContractResult<()> {
    let auction: AuctionId = ctx.parameter_cursor().get()?;
    let now = ctx.metadata().slot_time();
    let Settlement {
        token,
        seller,
        curator,
        curator_fee,
        currency,
        winning_bid,
    } = host.state_mut().settle(auction, now)?;

    let delivered = transfer_token(
        host,
        &token,
        Address::Contract(ctx.self_address()),
        Receiver::Account(winning_bid.bidder),
        TokenAmountU64(1),
    );
    if delivered.is_err() {
        // The token cannot leave the house. Give the winner their money
        // back and park the token for the seller.
        host.state_mut().bury(auction, token.clone(), seller);
        pay_out(ctx, host, &currency, &winning_bid.bidder, winning_bid.amount)?;
        logger.log(&AuctionEvent::Aborted(AbortedEvent {
            auction,
            token,
            heir: seller,
            refunded: Some(winning_bid),
        }))?;
        return Ok(());
    }

    let mut seller_share = winning_bid.amount;
    let mut curator_share = TokenAmountU64(0);
    if let Some(curator) = curator {
        let cut = curator_fee * winning_bid.amount;
        if cut > TokenAmountU64(0) && pay_out(ctx, host, &currency, &curator, cut).is_ok() {
            seller_share -= cut;
            curator_share = cut;
        }
    }
    pay_out(ctx, host, &currency, &seller, seller_share)?;
    logger.log(&AuctionEvent::Ended(EndedEvent {
        auction,
        token,
        seller,
        winner: winning_bid.bidder,
        amount: winning_bid.amount,
        seller_share,
        curator_share,
    }))?;
    Ok(())
}

/// Withdraws an auction nobody has bid on yet. Seller or curator only. The
/// token is handed back to the seller; if the token contract refuses even
/// that, the token is parked in a grave instead.
#[receive(
    contract = "auction_house",
    name = "cancelAuction",
    parameter = "AuctionId",
    error = "ContractError",
    enable_logger,
    mutable
)]
fn contract_cancel_auction(
    ctx: &ReceiveContext,
    host: &mut Host<State>,
    logger: &mut impl HasLogger,
) -> ContractResult<()> {
    let auction: AuctionId = ctx.parameter_cursor().get()?;
    let sender = ctx.sender();
    let Cancellation { token, seller } = host.state_mut().cancel(auction, &sender)?;

    let returned = transfer_token(
        host,
        &token,
        Address::Contract(ctx.self_address()),
        Receiver::Account(seller),
        TokenAmountU64(1),
    );
    if returned.is_err() {
        host.state_mut().bury(auction, token.clone(), seller);
        logger.log(&AuctionEvent::Aborted(AbortedEvent {
            auction,
            token,
            heir: seller,
            refunded: None,
        }))?;
        return Ok(());
    }

    logger.log(&AuctionEvent::Canceled(CanceledEvent { auction, token, seller }))?;
    Ok(())
}

/// Pulls a parked token out of its grave, to its heir. If the transfer
/// fails again the grave stays where it is.
#[receive(
    contract = "auction_house",
    name = "recover",
    parameter = "AuctionId",
    error = "ContractError",
    enable_logger,
    mutable
)]
fn contract_recover(
    ctx: &ReceiveContext,
    host: &mut Host<State>,
    logger: &mut impl HasLogger,
) -> ContractResult<()> {
    let auction: AuctionId = ctx.parameter_cursor().get()?;
    let sender = ctx.sender();
    let GraveData { token, heir } = host.state_mut().recover(auction, &sender)?;

    // A failure here rolls the grave back into place.
    transfer_token(
        host,
        &token,
        Address::Contract(ctx.self_address()),
        Receiver::Account(heir),
        TokenAmountU64(1),
    )?;
    logger.log(&AuctionEvent::Recovered(RecoveredEvent { auction, token, heir }))?;
    Ok(())
}

/// Hook called by CIS-2 contracts when tokens land in the house. Only a
/// deposit the house has just asked for is accepted; anything unsolicited
/// is rejected, which makes the sending contract roll the transfer back.
#[receive(
    contract = "auction_house",
    name = "onReceivingCIS2",
    parameter = "OnReceivingCis2Parameter",
    error = "ContractError",
    mutable
)]
fn contract_on_cis2_received(ctx: &ReceiveContext, host: &mut Host<State>) -> ContractResult<()> {
    let contract = match ctx.sender() {
        Address::Contract(contract) => contract,
        Address::Account(_) => bail!(CustomContractError::ContractOnly.into()),
    };
    let params: OnReceivingCis2Parameter = ctx.parameter_cursor().get()?;
    let expected = match host.state_mut().take_expected_deposit() {
        Some(deposit) => deposit,
        None => bail!(CustomContractError::UnexpectedDeposit.into()),
    };
    let received = Deposit {
        token: Token {
            contract,
            id: params.token_id,
        },
        from: params.from,
        amount: params.amount,
    };
    ensure!(expected == received, CustomContractError::UnexpectedDeposit.into());
    Ok(())
}

/// Returns the whole auction book.
#[receive(contract = "auction_house", name = "view", return_value = "ViewState")]
fn contract_view(_ctx: &ReceiveContext, host: &Host<State>) -> ReceiveResult<ViewState> {
    let state = host.state();
    let mut auctions = Vec::new();
    for (auction, slot) in state.auctions.iter() {
        auctions.push((*auction, AuctionSlotView::from(&*slot)));
    }
    Ok(ViewState {
        counter: state.counter,
        auctions,
    })
}

/// Looks up one auction.
#[receive(
    contract = "auction_house",
    name = "viewAuction",
    parameter = "AuctionId",
    return_value = "AuctionSlotView",
    error = "ContractError"
)]
fn contract_view_auction(
    ctx: &ReceiveContext,
    host: &Host<State>,
) -> ContractResult<AuctionSlotView> {
    let auction: AuctionId = ctx.parameter_cursor().get()?;
    let slot = host
        .state()
        .auctions
        .get(&auction)
        .ok_or(CustomContractError::NoSuchAuction)?;
    Ok(AuctionSlotView::from(&*slot))
}
