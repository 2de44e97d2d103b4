//! サーバー停止要求
//!
//! `server::serve` はOSシグナルに加えてこのコントローラーも待つ。
//! `faas` をライブラリとして組み込む側は `AppState::shutdown` 経由で
//! シグナルを送らずにサーバーと同期ループを止められる。

use tokio::sync::watch;

/// 停止要求を共有するハンドル（クローンは同じ状態を指す）
#[derive(Clone, Debug)]
pub struct ShutdownController {
    requested: watch::Sender<bool>,
}

impl Default for ShutdownController {
    fn default() -> Self {
        Self {
            requested: watch::Sender::new(false),
        }
    }
}

impl ShutdownController {
    /// 停止が要求済みか
    pub fn is_shutdown_requested(&self) -> bool {
        *self.requested.borrow()
    }

    /// 停止を要求し、待機中のタスクをすべて起こす
    pub fn request_shutdown(&self) {
        self.requested.send_replace(true);
    }

    /// 停止が要求されるまで待つ（要求済みなら即座に返る）
    pub async fn wait(&self) {
        let mut rx = self.requested.subscribe();
        // 送信側は self が保持しているため、チャネルが閉じることはない
        let _ = rx.wait_for(|requested| *requested).await;
    }
}
