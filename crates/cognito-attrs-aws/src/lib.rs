//! AWS gateway for cognito-attrs.
//!
//! Implements the `cognito_attrs_core` gateway traits over the CloudFormation
//! and Cognito Identity Provider SDK clients:
//!
//! | Trait method      | AWS operation                |
//! |-------------------|------------------------------|
//! | `describe_stack`  | `DescribeStacks`             |
//! | `describe_pool`   | `DescribeUserPool`           |
//! | `add_attributes`  | `AddCustomAttributes`        |
//! | `describe_client` | `DescribeUserPoolClient`     |
//! | `update_client`   | `UpdateUserPoolClient`       |

pub mod error;
mod gateway;

pub use error::{AwsGatewayError, Result};
pub use gateway::{AwsGateway, AwsGatewayConfig};
