//! App actor - message loop processing UI events and API results

use tokio::sync::mpsc;

use crate::app::state::AppState;
use crate::messages::{ApiCommand, ApiResult, RenderState, UiEvent};

/// App actor that processes UI events and API results
pub struct AppActor {
    state: AppState,
    api_tx: mpsc::UnboundedSender<ApiCommand>,
    render_tx: mpsc::UnboundedSender<RenderState>,
}

impl AppActor {
    pub fn new(
        state: AppState,
        api_tx: mpsc::UnboundedSender<ApiCommand>,
        render_tx: mpsc::UnboundedSender<RenderState>,
    ) -> Self {
        AppActor {
            state,
            api_tx,
            render_tx,
        }
    }

    /// Run the actor message loop
    pub async fn run(
        mut self,
        mut ui_rx: mpsc::UnboundedReceiver<UiEvent>,
        mut api_rx: mpsc::UnboundedReceiver<ApiResult>,
    ) {
        // kick off the initial list load and render
        let initial = self.state.initial_commands();
        self.dispatch(initial);
        let _ = self.render_tx.send(self.state.to_render_state());

        loop {
            tokio::select! {
                Some(event) = ui_rx.recv() => {
                    if matches!(event, UiEvent::Quit) {
                        let _ = self.api_tx.send(ApiCommand::Shutdown);
                        break;
                    }
                    let cmds = self.state.handle_event(event);
                    self.dispatch(cmds);
                    let _ = self.render_tx.send(self.state.to_render_state());
                }
                Some(result) = api_rx.recv() => {
                    let cmds = self.state.handle_result(result);
                    self.dispatch(cmds);
                    let _ = self.render_tx.send(self.state.to_render_state());
                }
                else => break,
            }
        }
    }

    fn dispatch(&self, cmds: Vec<ApiCommand>) {
        for cmd in cmds {
            let _ = self.api_tx.send(cmd);
        }
    }
}
