//! 发送路径与重配置语义的集成测试。

mod support;

use std::sync::Arc;
use std::time::Duration;

use flint_remoting::channel::{Addressable, Resettable, Sendable};
use flint_remoting::constants::{CONNECT_TIMEOUT_KEY, TIMEOUT_KEY};
use flint_remoting::error::{RemotingError, TransportFault, codes};
use flint_remoting::transport::TransportConnection;
use flint_remoting::url::EndpointUrl;
use flint_remoting_tokio::TokioChannel;
use support::{FakeConnection, codec_registry, endpoint_url, noop_handler, request_payload};

fn channel_over(connection: &Arc<FakeConnection>, url: Arc<EndpointUrl>) -> TokioChannel {
    TokioChannel::new(
        connection.as_connection(),
        url,
        noop_handler(),
        codec_registry(&["telnet"]),
    )
}

/// 验证有界等待在配置超时后以超时失败返回，且不取消已提交的写入。
///
/// # 测试目标（Why）
/// - 写入永不完成时发送不得无限阻塞；超时报告必须引用消息摘要、通道
///   标签与判定所用的超时值；
/// - 超时只改变向调用方的报告，完成端必须仍握在传输方手中。
///
/// # 测试步骤（How）
/// 1. 在暂停时钟下以 `timeout=200` 构造通道并发送（等待交付）；
/// 2. 断言经过约 200ms 后返回 `SendTimeout`；
/// 3. 断言写入已提交且完成端仍暂存（未被取消）。
#[tokio::test(start_paused = true)]
async fn bounded_wait_times_out_without_cancelling_the_write() {
    let connection = FakeConnection::stalled(1);
    let url = Arc::new(
        EndpointUrl::new("flint", "10.1.0.1", 20_880).with_parameter(TIMEOUT_KEY, "200"),
    );
    let channel = channel_over(&connection, url);

    let started = tokio::time::Instant::now();
    let error = channel
        .send(request_payload(), true)
        .await
        .expect_err("写入永不完成时应超时");
    assert!(started.elapsed() >= Duration::from_millis(200));

    match &error {
        RemotingError::SendTimeout {
            message,
            timeout_ms,
            channel: label,
        } => {
            assert_eq!(*timeout_ms, 200);
            assert!(message.contains("request(3B)"), "超时报告应嵌入消息摘要");
            assert_eq!(label.remote, connection.remote_addr());
        }
        other => panic!("预期超时失败，实际为 {other:?}"),
    }

    assert_eq!(connection.writes(), 1, "写入应已提交");
    assert_eq!(connection.pending_len(), 1, "超时不应取消已提交的写入");

    // 等待方已放弃，迟到的完成只能由传输方经自身结果通道观测。
    assert_eq!(connection.complete_first_pending(Ok(())), Some(false));
}

/// 验证票据上已记录的故障无论是否等待交付都立即上报。
#[tokio::test]
async fn recorded_fault_is_reraised_regardless_of_waiting() {
    let connection = FakeConnection::failing(1, codes::WRITE_FAILED);
    let channel = channel_over(&connection, endpoint_url());

    for await_delivery in [true, false] {
        let error = channel
            .send(request_payload(), await_delivery)
            .await
            .expect_err("同步故障应立即浮出");
        match &error {
            RemotingError::SendFailed { fault, message, .. } => {
                assert_eq!(fault.code(), codes::WRITE_FAILED);
                assert!(message.contains("request(3B)"));
            }
            other => panic!("预期传输故障，实际为 {other:?}"),
        }
    }
}

/// 验证“只提交不等待”的发送在提交后立即返回，迟到故障不再送达调用方。
///
/// # 输入/输出契约（What）
/// - **后置条件**：返回 `Ok` 时写入已提交；其后发生的故障由传输方经
///   完成信号的回报端观测（`delivered = false` 证明通道仍在、只是无人
///   监听），不会被静默丢弃在半途。
#[tokio::test]
async fn fire_and_forget_returns_once_submitted() {
    let connection = FakeConnection::stalled(1);
    let channel = channel_over(&connection, endpoint_url());

    channel
        .send(request_payload(), false)
        .await
        .expect("提交成功即应返回 Ok");
    assert_eq!(connection.writes(), 1);
    assert_eq!(connection.pending_len(), 1);

    let delivered = connection
        .complete_first_pending(Err(TransportFault::new(codes::WRITE_FAILED, "late failure")))
        .expect("完成端应仍暂存");
    assert!(!delivered, "调用方已离场，迟到故障只在传输方一侧可见");
}

/// 验证超时为 0 时的即时判定语义：不等待网络完成。
#[tokio::test]
async fn zero_timeout_yields_an_immediate_verdict() {
    let stalled = FakeConnection::stalled(1);
    let channel = channel_over(&stalled, endpoint_url());
    channel.endpoint().set_timeout_ms(0);

    let error = channel
        .send(request_payload(), true)
        .await
        .expect_err("写入未完成时应立即判超时");
    assert!(matches!(
        &error,
        RemotingError::SendTimeout { timeout_ms: 0, .. }
    ));

    let completing = FakeConnection::completing(2);
    let channel = channel_over(&completing, endpoint_url());
    channel.endpoint().set_timeout_ms(0);
    channel
        .send(request_payload(), true)
        .await
        .expect("已同步完成的写入应即时判成功");
}

/// 验证关闭后的通道在提交任何写入前即拒绝发送。
#[tokio::test]
async fn closed_channel_rejects_send_before_writing() {
    let connection = FakeConnection::stalled(1);
    let channel = channel_over(&connection, endpoint_url());
    channel.close();

    let error = channel
        .send(request_payload(), true)
        .await
        .expect_err("关闭后应拒绝发送");
    assert!(matches!(
        &error,
        RemotingError::ChannelClosed {
            operation: "send message",
            ..
        }
    ));
    assert_eq!(connection.writes(), 0, "拒绝必须发生在任何写入之前");
}

/// 验证关闭后的重配置失败且不改动任何字段。
#[test]
fn reset_on_closed_channel_changes_nothing() {
    let connection = FakeConnection::stalled(1);
    let url = Arc::new(
        EndpointUrl::new("flint", "10.1.0.1", 20_880).with_parameter(TIMEOUT_KEY, "5"),
    );
    let channel = channel_over(&connection, url);
    channel.close();

    let retune = EndpointUrl::new("flint", "10.1.0.1", 20_880).with_parameter(TIMEOUT_KEY, "10");
    let error = channel.reset(&retune).expect_err("关闭后重配置应失败");
    assert!(matches!(
        &error,
        RemotingError::ChannelClosed {
            operation: "reset parameters",
            ..
        }
    ));
    assert_eq!(channel.endpoint().timeout_ms(), 5, "失败的重配置不应触碰字段");
}

/// 验证经通道入口的部分重配置：仅 URL 携带的参数被替换。
#[test]
fn reset_applies_a_partial_update() {
    let connection = FakeConnection::stalled(1);
    let url = Arc::new(
        EndpointUrl::new("flint", "10.1.0.1", 20_880)
            .with_parameter(TIMEOUT_KEY, "5")
            .with_parameter(CONNECT_TIMEOUT_KEY, "5"),
    );
    let channel = channel_over(&connection, url);

    let retune = EndpointUrl::new("flint", "10.1.0.1", 20_880).with_parameter(TIMEOUT_KEY, "10");
    channel.reset(&retune).expect("存活通道的重配置应成功");

    assert_eq!(channel.endpoint().timeout_ms(), 10);
    assert_eq!(channel.endpoint().connect_timeout_ms(), 5);
    assert_eq!(channel.endpoint().codec_name().as_ref(), "telnet");
}

/// 验证重配置后的新超时对后续发送即时生效。
#[tokio::test(start_paused = true)]
async fn reset_timeout_takes_effect_on_subsequent_sends() {
    let connection = FakeConnection::stalled(1);
    let url = Arc::new(
        EndpointUrl::new("flint", "10.1.0.1", 20_880).with_parameter(TIMEOUT_KEY, "200"),
    );
    let channel = channel_over(&connection, url);

    let retune = EndpointUrl::new("flint", "10.1.0.1", 20_880).with_parameter(TIMEOUT_KEY, "50");
    channel.reset(&retune).expect("重配置应成功");

    let started = tokio::time::Instant::now();
    let error = channel
        .send(request_payload(), true)
        .await
        .expect_err("写入永不完成时应超时");
    assert!(matches!(
        &error,
        RemotingError::SendTimeout { timeout_ms: 50, .. }
    ));
    assert!(started.elapsed() < Duration::from_millis(200), "应按新超时判定");
}

/// 验证存活状态为实时透传而非缓存。
#[test]
fn connectivity_is_queried_live_from_the_transport() {
    let connection = FakeConnection::stalled(1);
    let channel = channel_over(&connection, endpoint_url());

    assert!(channel.is_connected());
    connection.set_active(false);
    assert!(!channel.is_connected(), "存活查询不得缓存旧值");
    assert_eq!(channel.remote_addr(), connection.remote_addr());
    assert_eq!(channel.local_addr(), connection.local_addr());
}

/// 验证通道的诊断文本嵌入连接标识与远端地址。
#[test]
fn display_embeds_connection_and_remote() {
    let connection = FakeConnection::stalled(7);
    let channel = channel_over(&connection, endpoint_url());

    let text = channel.to_string();
    assert!(text.contains("conn-7"));
    assert!(text.contains(&connection.remote_addr().to_string()));
}
