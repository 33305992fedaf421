//! # Player 模块
//!
//! 时间轴播放器：把一棵动画树播放到元素的内联样式上。
//!
//! ## 播放流程
//!
//! ```text
//! new(root)   展开为轨道（子节点继承时长/缓动）
//! start()     移除 before_remove_classes，清除 before_clear_styles，写入起始值
//! update(dt)  推进时间，写入插值
//! 完成        写入终值，按关键帧标记和 after_clear_styles 清除样式
//! ```
//!
//! 所有轨道从 0 时刻同时开始，播放器总时长为最长轨道的时长。

mod track;

pub use track::{PlaybackState, Track};

use nav_runtime::{AnimationNode, EasingFunction, ElementRef, StyleProperty};

/// 节点级的播放前后操作
#[derive(Debug, Clone)]
struct NodeEffects {
    targets: Vec<ElementRef>,
    remove_classes: Vec<String>,
    before_clear: Vec<StyleProperty>,
    after_clear: Vec<StyleProperty>,
}

/// 时间轴播放器
#[derive(Debug, Clone)]
pub struct TimelinePlayer {
    tracks: Vec<Track>,
    effects: Vec<NodeEffects>,
    state: PlaybackState,
    elapsed: f32,
    duration: f32,
}

impl TimelinePlayer {
    /// 从动画树创建播放器（尚未开始）
    pub fn new(root: &AnimationNode) -> Self {
        let mut player = Self {
            tracks: Vec::new(),
            effects: Vec::new(),
            state: PlaybackState::Pending,
            elapsed: 0.0,
            duration: 0.0,
        };
        player.flatten(
            root,
            root.duration().unwrap_or(0.0),
            root.easing().unwrap_or_default(),
        );
        player.duration = player
            .tracks
            .iter()
            .map(|t| t.duration)
            .fold(root.duration().unwrap_or(0.0), f32::max);
        player
    }

    /// 创建并立即开始播放
    pub fn play(root: &AnimationNode) -> Self {
        let mut player = Self::new(root);
        player.start();
        player
    }

    fn flatten(&mut self, node: &AnimationNode, duration: f32, easing: EasingFunction) {
        let duration = node.duration().unwrap_or(duration);
        let easing = node.easing().unwrap_or(easing);

        for target in node.targets() {
            for keyframe in node.keyframes() {
                self.tracks
                    .push(Track::new(node.label(), target.clone(), *keyframe, duration, easing));
            }
        }

        if !node.before_remove_classes().is_empty()
            || !node.before_clear_style_list().is_empty()
            || !node.after_clear_style_list().is_empty()
        {
            self.effects.push(NodeEffects {
                targets: node.targets().to_vec(),
                remove_classes: node.before_remove_classes().to_vec(),
                before_clear: node.before_clear_style_list().to_vec(),
                after_clear: node.after_clear_style_list().to_vec(),
            });
        }

        for child in node.children() {
            self.flatten(child, duration, easing);
        }
    }

    // ========== 控制 ==========

    /// 开始播放
    ///
    /// 只在 `Pending` 状态下生效。总时长为 0 时立即完成。
    pub fn start(&mut self) {
        if self.state != PlaybackState::Pending {
            return;
        }

        for effect in &self.effects {
            for target in &effect.targets {
                for class in &effect.remove_classes {
                    target.remove_class(class);
                }
                for style in &effect.before_clear {
                    target.clear_style(*style);
                }
            }
        }
        for track in &mut self.tracks {
            track.sample(0.0);
        }

        self.state = PlaybackState::Playing;
        if self.duration <= 0.0 {
            self.complete(PlaybackState::Completed);
        }
    }

    /// 推进播放
    ///
    /// # 返回
    /// - `true`: 仍在播放中
    /// - `false`: 已结束
    pub fn update(&mut self, dt: f32) -> bool {
        if self.state == PlaybackState::Pending {
            self.start();
        }
        if self.state != PlaybackState::Playing {
            return !self.state.is_finished();
        }

        self.elapsed += dt.max(0.0);
        for track in &mut self.tracks {
            track.sample(self.elapsed);
        }

        if self.elapsed >= self.duration {
            self.complete(PlaybackState::Completed);
            return false;
        }
        true
    }

    /// 跳过动画，直接写入终态
    pub fn skip(&mut self) {
        if self.state.is_active() {
            self.start();
            self.complete(PlaybackState::Skipped);
        }
    }

    /// 强制完成（包括暂停中的动画）
    pub fn finish(&mut self) {
        if self.state.is_finished() {
            return;
        }
        self.start();
        self.complete(PlaybackState::Completed);
    }

    /// 暂停
    pub fn pause(&mut self) {
        if self.state == PlaybackState::Playing {
            self.state = PlaybackState::Paused;
        }
    }

    /// 恢复
    pub fn resume(&mut self) {
        if self.state == PlaybackState::Paused {
            self.state = PlaybackState::Playing;
        }
    }

    fn complete(&mut self, state: PlaybackState) {
        if self.state.is_finished() {
            return;
        }

        for track in &mut self.tracks {
            track.complete();
        }
        for track in &self.tracks {
            if track.keyframe.clear_on_finish {
                track.element.clear_style(track.keyframe.property.style());
            }
        }
        for effect in &self.effects {
            for target in &effect.targets {
                for style in &effect.after_clear {
                    target.clear_style(*style);
                }
            }
        }

        self.elapsed = self.duration;
        self.state = state;
    }

    // ========== 查询 ==========

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active() || self.state == PlaybackState::Paused
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    /// 总时长（秒）
    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// 整体进度（0.0 - 1.0，未应用缓动）
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            return if self.is_finished() { 1.0 } else { 0.0 };
        }
        (self.elapsed / self.duration).clamp(0.0, 1.0)
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nav_runtime::transition::builders;
    use nav_runtime::{
        AnimProperty, AnimValue, Element, ElementKind, NavDirection, PageTemplate, TransitionOptions,
        classes,
    };

    fn fade_in(target: &ElementRef, duration: f32) -> AnimationNode {
        AnimationNode::new("fade-in")
            .with_target(target)
            .with_duration(duration)
            .with_easing(EasingFunction::Linear)
            .from_to(
                AnimProperty::Opacity,
                AnimValue::Scalar(0.0),
                AnimValue::Scalar(1.0),
                true,
            )
    }

    #[test]
    fn test_start_writes_from_values() {
        let el = Element::leaf(ElementKind::Content);
        let player = TimelinePlayer::play(&fade_in(&el, 1.0));
        assert_eq!(player.state(), PlaybackState::Playing);
        assert_eq!(el.style(AnimProperty::Opacity), Some(AnimValue::Scalar(0.0)));
    }

    #[test]
    fn test_update_interpolates_and_completes() {
        let el = Element::leaf(ElementKind::Content);
        let mut player = TimelinePlayer::new(&fade_in(&el, 1.0));

        assert!(player.update(0.5));
        assert_eq!(el.style(AnimProperty::Opacity), Some(AnimValue::Scalar(0.5)));
        assert!((player.progress() - 0.5).abs() < 1e-6);

        assert!(!player.update(0.6));
        assert_eq!(player.state(), PlaybackState::Completed);
        // 关键帧标记清除，播放结束后没有残余样式
        assert!(el.is_style_free());
    }

    #[test]
    fn test_children_inherit_timing() {
        let el = Element::leaf(ElementKind::Title);
        let child = AnimationNode::new("child").with_target(&el).from_to(
            AnimProperty::TranslateX,
            AnimValue::Percent(100.0),
            AnimValue::Percent(0.0),
            true,
        );
        let root = AnimationNode::new("root")
            .with_duration(0.4)
            .with_easing(EasingFunction::Linear)
            .with_child(child);

        let player = TimelinePlayer::new(&root);
        assert_eq!(player.tracks().len(), 1);
        assert_eq!(player.tracks()[0].duration, 0.4);
        assert_eq!(player.tracks()[0].easing, EasingFunction::Linear);
        assert_eq!(player.duration(), 0.4);
    }

    #[test]
    fn test_before_and_after_effects() {
        let page = Element::builder(ElementKind::Generic("page".to_string()))
            .class(classes::PAGE_INVISIBLE)
            .build();
        page.set_style(AnimProperty::Opacity, AnimValue::Scalar(0.3));
        let title = Element::leaf(ElementKind::Title);

        let root = AnimationNode::new("root")
            .with_target(&page)
            .with_duration(0.2)
            .before_remove_class(classes::PAGE_INVISIBLE)
            .before_clear_styles(&[StyleProperty::Opacity])
            .with_child(
                AnimationNode::new("title")
                    .with_target(&title)
                    .from_to(
                        AnimProperty::TranslateX,
                        AnimValue::Percent(0.0),
                        AnimValue::Percent(-33.0),
                        false,
                    )
                    .after_clear_styles(&[StyleProperty::Transform]),
            );

        let mut player = TimelinePlayer::play(&root);
        assert!(!page.has_class(classes::PAGE_INVISIBLE));
        assert!(page.is_style_free());

        player.update(1.0);
        assert!(title.is_style_free());
    }

    #[test]
    fn test_skip_jumps_to_end() {
        let el = Element::leaf(ElementKind::Content);
        let mut player = TimelinePlayer::play(&fade_in(&el, 1.0));
        player.update(0.1);
        player.skip();
        assert_eq!(player.state(), PlaybackState::Skipped);
        assert!(el.is_style_free());
        assert!(!player.update(0.1));
    }

    #[test]
    fn test_pause_and_finish() {
        let el = Element::leaf(ElementKind::Content);
        let mut player = TimelinePlayer::play(&fade_in(&el, 1.0));
        player.update(0.2);
        player.pause();
        assert!(player.update(5.0));
        assert_eq!(el.style(AnimProperty::Opacity), Some(AnimValue::Scalar(0.2)));

        // 暂停中的动画 skip 无效，finish 仍然生效
        player.skip();
        assert_eq!(player.state(), PlaybackState::Paused);
        player.finish();
        assert_eq!(player.state(), PlaybackState::Completed);
        assert!(el.is_style_free());
    }

    #[test]
    fn test_zero_duration_completes_on_start() {
        let el = Element::leaf(ElementKind::Content);
        let player = TimelinePlayer::play(&fade_in(&el, 0.0));
        assert!(player.is_finished());
        assert_eq!(player.progress(), 1.0);
        assert!(el.is_style_free());
    }

    #[test]
    fn test_builder_trees_leave_elements_clean() {
        let entering = PageTemplate::detail("B").with_buttons().with_footer().build();
        let leaving = PageTemplate::titled("A").with_toolbar_item("segment").build();
        let opts = TransitionOptions::new(NavDirection::Forward, entering.clone())
            .with_leaving(leaving.clone());

        for build in [
            builders::edge_slide as nav_runtime::BuilderFn,
            builders::fade_scale,
            builders::fade,
            builders::hard_slide,
        ] {
            let tree = build(&opts);
            let mut player = TimelinePlayer::play(&tree);
            player.update(0.1);
            while player.update(0.1) {}

            let mut elements = Vec::new();
            tree.walk(&mut |node| elements.extend(node.targets().iter().cloned()));
            assert!(elements.iter().all(|e| e.is_style_free()), "{}", tree.label());
        }
    }
}
