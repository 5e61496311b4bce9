use cosmwasm_std::StdError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConductorError {
    #[error("AcceptedTokenNotFound")]
    AcceptedTokenNotFound,

    #[error("AlreadyClaimed")]
    AlreadyClaimed,

    #[error("ContributionAlreadyCollected")]
    ContributionAlreadyCollected,

    #[error("ContributionsNotCollected")]
    ContributionsNotCollected,

    #[error("ContributorAlreadyRegistered")]
    ContributorAlreadyRegistered,

    #[error("ContributorNotRegistered")]
    ContributorNotRegistered,

    #[error("InvalidAcceptedTokens")]
    InvalidAcceptedTokens,

    #[error("InvalidContributor")]
    InvalidContributor,

    #[error("InvalidRaiseParameters")]
    InvalidRaiseParameters,

    #[error("InvalidVaaAction")]
    InvalidVaaAction,

    #[error("NotInitialized")]
    NotInitialized,

    #[error("SaleEnded")]
    SaleEnded,

    #[error("SaleNotAborted")]
    SaleNotAborted,

    #[error("SaleNotFinished")]
    SaleNotFinished,

    #[error("SaleNotFound")]
    SaleNotFound,

    #[error("SaleStarted")]
    SaleStarted,

    #[error("SaleStatusNotFound")]
    SaleStatusNotFound,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("UnsupportedSaleToken")]
    UnsupportedSaleToken,

    #[error("VaaAlreadyExecuted")]
    VaaAlreadyExecuted,

    #[error("WrongChain")]
    WrongChain,

    #[error("ZeroAmount")]
    ZeroAmount,
}

impl ConductorError {
    pub fn std(&self) -> StdError {
        StdError::GenericErr {
            msg: format!("{}", self),
        }
    }

    pub fn std_err<T>(&self) -> Result<T, StdError> {
        Err(self.std())
    }
}
