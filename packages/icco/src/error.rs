use cosmwasm_std::StdError;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum CommonError {
    #[error("MalformedPayload")]
    MalformedPayload,

    #[error("AmountTooLarge")]
    AmountTooLarge,

    #[error("InvalidVersion")]
    InvalidVersion,

    #[error("InvalidSignature")]
    InvalidSignature,

    #[error("InsufficientSignatures")]
    InsufficientSignatures,

    #[error("BadSignerOrder")]
    BadSignerOrder,

    #[error("EcdsaRecoverFailure")]
    EcdsaRecoverFailure,

    #[error("InvalidKycSignature")]
    InvalidKycSignature,
}

impl CommonError {
    pub fn std(&self) -> StdError {
        StdError::GenericErr {
            msg: format!("{}", self),
        }
    }

    pub fn std_err<T>(&self) -> Result<T, StdError> {
        Err(self.std())
    }
}
