//! 切换语言后的分步通知
//!
//! 语言切换时对当前已注册的观察者拍一份快照，之后由宿主的调度循环逐个推进
//! （每次 [`LocaleStore::step`] 通知一个），避免一次性刷新大量界面元素造成卡顿。
//!
//! 分发过程中再次切换语言时，未通知完的快照被丢弃，从第一个观察者重新开始。

use std::collections::VecDeque;
use std::rc::Rc;

use lingo_core::Language;

use crate::store::LocaleStore;

/// 语言切换时需要重新渲染的对象
pub trait Observer {
    fn localize(&self, store: &LocaleStore);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(u64);

/// 通知器状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    Idle,
    Dispatching { language: Language, remaining: usize },
}

struct Dispatch {
    language: Language,
    queue: VecDeque<ObserverId>,
}

#[derive(Default)]
pub struct Notifier {
    observers: Vec<(ObserverId, Rc<dyn Observer>)>,
    next_id: u64,
    pending: Option<Dispatch>,
}

impl Notifier {
    /// 注册观察者；同一对象重复注册时返回原来的编号
    pub fn register(&mut self, observer: Rc<dyn Observer>) -> ObserverId {
        if let Some((id, _)) = self
            .observers
            .iter()
            .find(|(_, existing)| Rc::ptr_eq(existing, &observer))
        {
            return *id;
        }

        let id = ObserverId(self.next_id);
        self.next_id += 1;
        self.observers.push((id, observer));
        id
    }

    /// 注销观察者；分发中尚未通知到的也不会再被通知
    pub fn deregister(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(existing, _)| *existing != id);
        before != self.observers.len()
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    pub fn state(&self) -> DispatchState {
        match &self.pending {
            None => DispatchState::Idle,
            Some(dispatch) => DispatchState::Dispatching {
                language: dispatch.language,
                remaining: dispatch.queue.len(),
            },
        }
    }

    pub fn is_dispatching(&self) -> bool {
        self.pending.is_some()
    }

    /// 开始一轮分发，进行中的分发会被取消
    pub(crate) fn start(&mut self, language: Language) {
        if let Some(previous) = self.pending.take() {
            tracing::debug!(
                from = %previous.language,
                to = %language,
                skipped = previous.queue.len(),
                "Restarting language dispatch"
            );
        }
        if self.observers.is_empty() {
            return;
        }
        self.pending = Some(Dispatch {
            language,
            queue: self.observers.iter().map(|(id, _)| *id).collect(),
        });
    }

    /// 取出下一个仍处于注册状态的观察者，队列耗尽后回到空闲状态
    pub(crate) fn next(&mut self) -> Option<Rc<dyn Observer>> {
        let dispatch = self.pending.as_mut()?;
        let mut found = None;
        while let Some(id) = dispatch.queue.pop_front() {
            if let Some((_, observer)) =
                self.observers.iter().find(|(existing, _)| *existing == id)
            {
                found = Some(observer.clone());
                break;
            }
        }
        if dispatch.queue.is_empty() {
            self.pending = None;
        }
        found
    }
}
