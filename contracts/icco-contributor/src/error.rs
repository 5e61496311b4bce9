use cosmwasm_std::StdError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContributorError {
    #[error("AcceptedTokenNotFound")]
    AcceptedTokenNotFound,

    #[error("AllocationNotFound")]
    AllocationNotFound,

    #[error("AlreadyClaimed")]
    AlreadyClaimed,

    #[error("BuyerNotActive")]
    BuyerNotActive,

    #[error("ContributionNotFound")]
    ContributionNotFound,

    #[error("ContributionTooEarly")]
    ContributionTooEarly,

    #[error("DisabledToken")]
    DisabledToken,

    #[error("IncorrectFunds")]
    IncorrectFunds,

    #[error("InsufficientFunds")]
    InsufficientFunds,

    #[error("InvalidConductor")]
    InvalidConductor,

    #[error("InvalidKycSignature")]
    InvalidKycSignature,

    #[error("InvalidVaaAction")]
    InvalidVaaAction,

    #[error("NonexistentBuyer")]
    NonexistentBuyer,

    #[error("NonexistentDenom")]
    NonexistentDenom,

    #[error("NonexistentToken")]
    NonexistentToken,

    #[error("NotInitialized")]
    NotInitialized,

    #[error("SaleAborted")]
    SaleAborted,

    #[error("SaleAlreadyAttested")]
    SaleAlreadyAttested,

    #[error("SaleAlreadyExists")]
    SaleAlreadyExists,

    #[error("SaleEnded")]
    SaleEnded,

    #[error("SaleNotAborted")]
    SaleNotAborted,

    #[error("SaleNotAttestable")]
    SaleNotAttestable,

    #[error("SaleNotFinished")]
    SaleNotFinished,

    #[error("SaleNotFound")]
    SaleNotFound,

    #[error("SaleStatusNotFound")]
    SaleStatusNotFound,

    #[error("SaleTimesNotFound")]
    SaleTimesNotFound,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("VaaAlreadyExecuted")]
    VaaAlreadyExecuted,

    #[error("WrongChain")]
    WrongChain,

    #[error("ZeroAmount")]
    ZeroAmount,
}

impl ContributorError {
    pub fn std(&self) -> StdError {
        StdError::GenericErr {
            msg: format!("{}", self),
        }
    }

    pub fn std_err<T>(&self) -> Result<T, StdError> {
        Err(self.std())
    }
}
