use std::cell::{Cell, RefCell};
use std::future::Future;
use std::rc::Rc;

use async_trait::async_trait;
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use crate::components::toast::{use_toast, Toast};
use crate::services::api::ApiClient;
use crate::services::error::ApiError;
use crate::services::sequence::Sequencer;

/// Everything one page (or panel) needs, fetched in one go
#[async_trait(?Send)]
pub trait PageState: Sized + 'static {
    /// Inputs the load depends on; a change triggers a reload
    type Params: Clone + PartialEq + 'static;

    /// Log target for this page's loads
    const TARGET: &'static str;

    /// Whether a header refresh toasts "Refreshed" once this state has reloaded
    const ANNOUNCE_REFRESH: bool = true;

    async fn load(api: &ApiClient, params: &Self::Params) -> Result<Self, ApiError>;
}

/// Loaded page state; `None` until the first load succeeds
pub struct PageData<S>(Option<S>);

impl<S> PageData<S> {
    pub fn get(&self) -> Option<&S> {
        self.0.as_ref()
    }
}

impl<S> Default for PageData<S> {
    fn default() -> Self {
        Self(None)
    }
}

pub enum PageAction<S> {
    /// A load completed; replaces whatever is held
    Loaded(S),
    /// Derive the next state from the latest one. Ignored before the first load.
    Modify(Box<dyn FnOnce(&S) -> S>),
}

impl<S> PageAction<S> {
    pub fn modify(f: impl FnOnce(&S) -> S + 'static) -> Self {
        Self::Modify(Box::new(f))
    }
}

impl<S: 'static> Reducible for PageData<S> {
    type Action = PageAction<S>;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        match action {
            PageAction::Loaded(state) => Rc::new(Self(Some(state))),
            PageAction::Modify(f) => match &self.0 {
                Some(current) => Rc::new(Self(Some(f(current)))),
                None => self,
            },
        }
    }
}

#[derive(Clone)]
pub struct UsePageDataActions {
    /// Re-run the load with the current params
    pub reload: Callback<()>,
    /// Queue a success toast for the next load that completes
    pub announce: Callback<&'static str>,
}

pub struct UsePageDataResult<S: PageState> {
    /// Dispatch `PageAction::modify` for local edits so they apply to the
    /// latest state rather than the one captured at render time
    pub data: UseReducerHandle<PageData<S>>,
    pub loading: bool,
    pub actions: UsePageDataActions,
}

struct LoadContext<S: PageState> {
    api: ApiClient,
    params: S::Params,
    data: UseReducerHandle<PageData<S>>,
    loading: UseStateHandle<bool>,
    sequencer: Sequencer,
    toast: Callback<Toast>,
    pending: Rc<RefCell<Option<&'static str>>>,
}

fn spawn_load<S: PageState>(ctx: LoadContext<S>) {
    let ticket = ctx.sequencer.issue();
    ctx.loading.set(true);
    spawn_local(async move {
        let result = S::load(&ctx.api, &ctx.params).await;
        if !ctx.sequencer.is_current(ticket) {
            log::debug!(target: S::TARGET, "dropping stale load #{}", ticket);
            return;
        }
        ctx.loading.set(false);
        let success = ctx.pending.borrow_mut().take();
        match result {
            Ok(state) => {
                ctx.data.dispatch(PageAction::Loaded(state));
                if let Some(message) = success {
                    ctx.toast.emit(Toast::ok(message));
                }
            }
            Err(e) => {
                match e.status() {
                    Some(status) => log::error!(target: S::TARGET, "load failed ({}): {}", status, e),
                    None => log::error!(target: S::TARGET, "load failed: {}", e),
                }
                ctx.toast.emit(Toast::error(String::from(e)));
            }
        }
    });
}

/// Load `S` on mount, whenever `params` change and whenever `refresh` is
/// bumped. Only the most recently issued load may apply its result.
#[hook]
pub fn use_page_data<S: PageState>(api_client: &ApiClient, refresh: u32, params: S::Params) -> UsePageDataResult<S> {
    let data = use_reducer(PageData::<S>::default);
    let loading = use_state(|| true);
    let sequencer = use_memo((), |_| Sequencer::new());
    let last_refresh: Rc<Cell<u32>> = use_memo((), move |_| Cell::new(refresh));
    let pending: Rc<RefCell<Option<&'static str>>> = use_memo((), |_| RefCell::new(None));
    let toast = use_toast();

    let context = {
        let api = api_client.clone();
        let data = data.clone();
        let loading = loading.clone();
        let sequencer = (*sequencer).clone();
        let toast = toast.clone();
        let pending = pending.clone();
        move |params: S::Params| LoadContext::<S> {
            api: api.clone(),
            params,
            data: data.clone(),
            loading: loading.clone(),
            sequencer: sequencer.clone(),
            toast: toast.clone(),
            pending: pending.clone(),
        }
    };

    {
        let context = context.clone();
        use_effect_with((refresh, params.clone()), move |(refresh, params)| {
            let ctx = context(params.clone());
            if S::ANNOUNCE_REFRESH && last_refresh.get() != *refresh {
                ctx.pending.replace(Some("Refreshed"));
            }
            last_refresh.set(*refresh);
            spawn_load(ctx);
            || ()
        });
    }

    let reload = use_callback((api_client.clone(), params), move |_: (), (_, params)| {
        spawn_load(context(params.clone()));
    });

    let announce = Callback::from(move |message: &'static str| {
        pending.replace(Some(message));
    });

    UsePageDataResult {
        data,
        loading: *loading,
        actions: UsePageDataActions { reload, announce },
    }
}

/// Await a page action, turning its error into an error toast. `on_ok` only
/// runs on success, so form state survives a failure untouched.
pub async fn run_action<T, Fut, F>(action: Fut, toast: Callback<Toast>, on_ok: F)
where
    Fut: Future<Output = Result<T, String>>,
    F: FnOnce(T),
{
    match action.await {
        Ok(value) => on_ok(value),
        Err(message) => toast.emit(Toast::error(message)),
    }
}

/// `run_action` on the local executor
pub fn spawn_action<T, Fut, F>(action: Fut, toast: Callback<Toast>, on_ok: F)
where
    T: 'static,
    Fut: Future<Output = Result<T, String>> + 'static,
    F: FnOnce(T) + 'static,
{
    spawn_local(run_action(action, toast, on_ok));
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;

    fn recorder() -> (Callback<Toast>, Rc<RefCell<Vec<Toast>>>) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        (Callback::from(move |t: Toast| sink.borrow_mut().push(t)), seen)
    }

    fn loaded(ids: &[i64]) -> Rc<PageData<Vec<i64>>> {
        Rc::new(PageData::default()).reduce(PageAction::Loaded(ids.to_vec()))
    }

    fn remove(id: i64) -> PageAction<Vec<i64>> {
        PageAction::modify(move |ids: &Vec<i64>| ids.iter().copied().filter(|i| *i != id).collect())
    }

    #[test]
    fn test_back_to_back_removals_both_stick() {
        let state = loaded(&[1, 2, 3]);
        let state = state.reduce(remove(1)).reduce(remove(2));
        assert_eq!(state.get(), Some(&vec![3]));
    }

    #[test]
    fn test_modify_before_first_load_is_ignored() {
        let state = Rc::new(PageData::<Vec<i64>>::default()).reduce(remove(1));
        assert_eq!(state.get(), None);

        let state = state.reduce(PageAction::Loaded(vec![7]));
        assert_eq!(state.get(), Some(&vec![7]));
    }

    #[test]
    fn test_failed_action_skips_on_ok_and_toasts() {
        let (toast, seen) = recorder();
        let called = Rc::new(Cell::new(false));
        let flag = called.clone();

        block_on(run_action(
            async { Err::<(), _>("tattoo required".to_string()) },
            toast,
            move |_| flag.set(true),
        ));

        assert!(!called.get());
        let seen = seen.borrow();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].message, "tattoo required");
        assert_eq!(seen[0].class(), "toast bad");
    }

    #[test]
    fn test_successful_action_runs_on_ok_silently() {
        let (toast, seen) = recorder();
        let got = Rc::new(Cell::new(0));
        let sink = got.clone();

        block_on(run_action(async { Ok::<_, String>(5) }, toast, move |v| sink.set(v)));

        assert_eq!(got.get(), 5);
        assert!(seen.borrow().is_empty());
    }
}
