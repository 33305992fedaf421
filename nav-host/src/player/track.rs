//! # Track 模块
//!
//! 单条播放轨道：一个元素上一个属性的 `from → to` 变化。
//!
//! 核心设计：轨道只关注时间轴上的插值，写入元素内联样式，不关心它来自哪个动画节点。

use nav_runtime::{AnimValue, EasingFunction, ElementRef, Keyframe};

/// 播放状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    /// 等待开始
    #[default]
    Pending,
    /// 正在播放
    Playing,
    /// 已暂停
    Paused,
    /// 已完成
    Completed,
    /// 已跳过
    Skipped,
}

impl PlaybackState {
    /// 是否为活跃状态（需要更新）
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Pending | Self::Playing)
    }

    /// 是否已结束
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Completed | Self::Skipped)
    }
}

/// 播放轨道
#[derive(Debug, Clone)]
pub struct Track {
    /// 所在动画节点的标签
    pub label: &'static str,
    /// 目标元素
    pub element: ElementRef,
    /// 关键帧
    pub keyframe: Keyframe,
    /// 时长（秒，已继承父节点）
    pub duration: f32,
    /// 缓动函数（已继承父节点）
    pub easing: EasingFunction,
    /// 当前进度（0.0 - 1.0，已应用缓动）
    progress: f32,
}

impl Track {
    pub fn new(
        label: &'static str,
        element: ElementRef,
        keyframe: Keyframe,
        duration: f32,
        easing: EasingFunction,
    ) -> Self {
        Self {
            label,
            element,
            keyframe,
            duration: duration.max(0.0),
            easing,
            progress: 0.0,
        }
    }

    /// 按经过时间采样并写入样式
    ///
    /// # 返回
    /// - `true`: 轨道仍在进行中
    /// - `false`: 轨道已到终点
    pub fn sample(&mut self, elapsed: f32) -> bool {
        let running = if self.duration <= 0.0 {
            self.progress = 1.0;
            false
        } else {
            let raw = elapsed / self.duration;
            if raw >= 1.0 {
                self.progress = 1.0;
                false
            } else {
                self.progress = self.easing.apply(raw);
                true
            }
        };
        self.write();
        running
    }

    /// 跳到终点
    pub fn complete(&mut self) {
        self.progress = 1.0;
        self.write();
    }

    /// 获取当前值
    pub fn current_value(&self) -> AnimValue {
        self.keyframe.from.lerp(&self.keyframe.to, self.progress)
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    fn write(&self) {
        self.element
            .set_style(self.keyframe.property, self.current_value());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nav_runtime::{AnimProperty, Element, ElementKind};

    fn create_test_track(duration: f32) -> Track {
        Track::new(
            "test",
            Element::leaf(ElementKind::Content),
            Keyframe {
                property: AnimProperty::Opacity,
                from: AnimValue::Scalar(0.0),
                to: AnimValue::Scalar(1.0),
                clear_on_finish: true,
            },
            duration,
            EasingFunction::Linear,
        )
    }

    #[test]
    fn test_track_sample() {
        let mut track = create_test_track(1.0);

        assert!(track.sample(0.25));
        assert_eq!(track.current_value(), AnimValue::Scalar(0.25));
        assert_eq!(
            track.element.style(AnimProperty::Opacity),
            Some(AnimValue::Scalar(0.25))
        );

        assert!(!track.sample(1.5));
        assert_eq!(track.progress(), 1.0);
        assert_eq!(
            track.element.style(AnimProperty::Opacity),
            Some(AnimValue::Scalar(1.0))
        );
    }

    #[test]
    fn test_zero_duration_track_completes_immediately() {
        let mut track = create_test_track(0.0);
        assert!(!track.sample(0.0));
        assert_eq!(track.current_value(), AnimValue::Scalar(1.0));
    }

    #[test]
    fn test_state_helpers() {
        assert!(PlaybackState::Pending.is_active());
        assert!(PlaybackState::Playing.is_active());
        assert!(!PlaybackState::Paused.is_active());
        assert!(PlaybackState::Skipped.is_finished());
        assert!(!PlaybackState::Paused.is_finished());
    }
}
