//! beacon-core
//!
//! Segment に track event を送る operator と、それを動かす最小限のホスト。
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（ids, connection, track, context, task, errors）
//! - **ports**: 抽象化レイヤー（CredentialResolver, AnalyticsClient, TemplateRenderer, Clock, IdGenerator）
//! - **impls**: ports の実装（Segment HTTP client, resolver, renderer, recording client）
//! - **typed**: 型付き Operator API（Operator trait, DynOperator, OperatorRegistry）
//! - **segment**: SegmentHook と SegmentTrackEventOperator
//! - **app**: AppBuilder と Runtime
//! - **config**: 設定ファイル + 環境変数
//! - **observability**: 実行ごとの TaskLogger

pub mod app;
pub mod config;
pub mod domain;
pub mod impls;
pub mod observability;
pub mod ports;
pub mod segment;
pub mod typed;
