//! ABI bindings for the Transactions contract

use alloy::sol;

sol! {
    /// A single on-chain transfer record
    ///
    /// Field order must match the deployed struct layout exactly.
    struct TransferStruct {
        address sender;
        address receiver;
        uint256 amount;
        string message;
        uint256 timestamp;
        string keyword;
    }

    function getAllTransactions() external view returns (TransferStruct[] memory);

    function getTransactionCount() external view returns (uint256);

    function addToBlockchain(
        address payable receiver,
        uint256 amount,
        string memory message,
        string memory keyword
    ) external;
}
