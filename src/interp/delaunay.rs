//! 2차원 Delaunay 삼각분할과 무게중심(barycentric) 보간.

use std::collections::{HashMap, HashSet};

/// 외접원 포함 판정 시 공원(cocircular) 점을 "밖"으로 취급하기 위한 상대 여유.
const CIRCUMCIRCLE_REL_EPS: f64 = 1e-12;
/// 삼각형 경계 위 점을 내부로 인정하는 무게중심 좌표 여유.
const BARYCENTRIC_EPS: f64 = 1e-10;

#[derive(Debug, Clone, Copy)]
struct Triangle {
    vertices: [usize; 3],
    circumcenter: (f64, f64),
    circumradius_sq: f64,
}

/// 점군의 Delaunay 삼각분할. 생성 후 변경되지 않는다.
#[derive(Debug, Clone)]
pub struct Triangulation {
    points: Vec<(f64, f64)>,
    triangles: Vec<[usize; 3]>,
}

impl Triangulation {
    /// Bowyer-Watson 점진 삽입으로 삼각분할을 만든다.
    ///
    /// 점이 3개 미만이거나 모두 한 직선 위에 있으면 삼각형이 없는 결과가 된다.
    pub fn new(points: &[(f64, f64)]) -> Self {
        let mut builder = Builder {
            points: points.to_vec(),
            triangles: Vec::new(),
        };
        let triangles = if points.len() < 3 {
            Vec::new()
        } else {
            builder.bowyer_watson()
        };
        Self {
            points: points.to_vec(),
            triangles,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    /// 점을 포함하는 삼각형의 꼭짓점과 무게중심 좌표를 찾는다. 볼록 껍질 밖이면 `None`.
    pub fn locate(&self, p: (f64, f64)) -> Option<([usize; 3], [f64; 3])> {
        if !(p.0.is_finite() && p.1.is_finite()) {
            return None;
        }
        self.triangles.iter().find_map(|tri| {
            let weights = self.barycentric(tri, p)?;
            weights
                .iter()
                .all(|w| *w >= -BARYCENTRIC_EPS)
                .then_some((*tri, weights))
        })
    }

    /// 점별 값 `values`를 선형(무게중심) 보간한다.
    pub fn interpolate(&self, values: &[f64], p: (f64, f64)) -> Option<f64> {
        let (tri, w) = self.locate(p)?;
        Some(w[0] * values[tri[0]] + w[1] * values[tri[1]] + w[2] * values[tri[2]])
    }

    /// 가장 가까운 점의 인덱스. 거리가 같으면 먼저 저장된 점을 고른다.
    pub fn nearest(&self, p: (f64, f64)) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (i, q) in self.points.iter().enumerate() {
            let dx = q.0 - p.0;
            let dy = q.1 - p.1;
            let d = dx * dx + dy * dy;
            match best {
                Some((_, bd)) if bd <= d => {}
                _ => best = Some((i, d)),
            }
        }
        best.map(|(i, _)| i)
    }

    fn barycentric(&self, tri: &[usize; 3], p: (f64, f64)) -> Option<[f64; 3]> {
        let (x0, y0) = self.points[tri[0]];
        let (x1, y1) = self.points[tri[1]];
        let (x2, y2) = self.points[tri[2]];
        let det = (y1 - y2) * (x0 - x2) + (x2 - x1) * (y0 - y2);
        if det == 0.0 {
            return None;
        }
        let l0 = ((y1 - y2) * (p.0 - x2) + (x2 - x1) * (p.1 - y2)) / det;
        let l1 = ((y2 - y0) * (p.0 - x2) + (x0 - x2) * (p.1 - y2)) / det;
        Some([l0, l1, 1.0 - l0 - l1])
    }
}

struct Builder {
    points: Vec<(f64, f64)>,
    triangles: Vec<Triangle>,
}

impl Builder {
    fn bowyer_watson(&mut self) -> Vec<[usize; 3]> {
        let (min_x, max_x, min_y, max_y) = self.bounding_box();
        let span = (max_x - min_x).max(max_y - min_y).max(f64::MIN_POSITIVE);
        // 초기 삼각형 꼭짓점이 얇은 껍질 삼각형의 외접원 안에 들지 않도록 크게 잡는다
        let d = span * 1.0e5;
        let mid_x = (min_x + max_x) / 2.0;
        let mid_y = (min_y + max_y) / 2.0;

        let n = self.points.len();
        self.points.push((mid_x - d, mid_y - d));
        self.points.push((mid_x + d, mid_y - d));
        self.points.push((mid_x, mid_y + d));
        let initial = self.make_triangle(n, n + 1, n + 2);
        self.triangles.push(initial);

        for i in 0..n {
            self.add_point(i);
        }

        let points = &self.points;
        let min_area = span * span * 1e-14;
        let mut triangles: Vec<[usize; 3]> = self
            .triangles
            .iter()
            .filter(|t| t.vertices.iter().all(|&v| v < n))
            .filter(|t| signed_area(points, t.vertices).abs() > min_area)
            .map(|t| counter_clockwise(points, t.vertices))
            .collect();
        close_hull(&points[..n], &mut triangles, min_area);
        triangles
    }

    fn add_point(&mut self, point_idx: usize) {
        let p = self.points[point_idx];

        let bad: Vec<usize> = self
            .triangles
            .iter()
            .enumerate()
            .filter(|(_, tri)| in_circumcircle(p, tri))
            .map(|(i, _)| i)
            .collect();

        // 제거될 삼각형들이 이루는 다각형 구멍의 경계
        let mut polygon = Vec::new();
        for &tri_idx in &bad {
            let tri = self.triangles[tri_idx];
            for (a, b) in [(0, 1), (1, 2), (2, 0)] {
                let edge = (tri.vertices[a], tri.vertices[b]);
                let shared = bad
                    .iter()
                    .any(|&other| other != tri_idx && has_edge(&self.triangles[other], edge));
                if !shared {
                    polygon.push(edge);
                }
            }
        }

        for idx in bad.into_iter().rev() {
            self.triangles.swap_remove(idx);
        }
        for (v0, v1) in polygon {
            let tri = self.make_triangle(v0, v1, point_idx);
            self.triangles.push(tri);
        }
    }

    fn make_triangle(&self, i0: usize, i1: usize, i2: usize) -> Triangle {
        let p0 = self.points[i0];
        let p1 = self.points[i1];
        let p2 = self.points[i2];

        let d = 2.0 * (p0.0 * (p1.1 - p2.1) + p1.0 * (p2.1 - p0.1) + p2.0 * (p0.1 - p1.1));
        let (cx, cy) = if d.abs() > f64::EPSILON * 1e-4 {
            let s0 = p0.0 * p0.0 + p0.1 * p0.1;
            let s1 = p1.0 * p1.0 + p1.1 * p1.1;
            let s2 = p2.0 * p2.0 + p2.1 * p2.1;
            let ux = (s0 * (p1.1 - p2.1) + s1 * (p2.1 - p0.1) + s2 * (p0.1 - p1.1)) / d;
            let uy = (s0 * (p2.0 - p1.0) + s1 * (p0.0 - p2.0) + s2 * (p1.0 - p0.0)) / d;
            (ux, uy)
        } else {
            ((p0.0 + p1.0 + p2.0) / 3.0, (p0.1 + p1.1 + p2.1) / 3.0)
        };

        let dx = p0.0 - cx;
        let dy = p0.1 - cy;
        Triangle {
            vertices: [i0, i1, i2],
            circumcenter: (cx, cy),
            circumradius_sq: dx * dx + dy * dy,
        }
    }

    fn bounding_box(&self) -> (f64, f64, f64, f64) {
        let mut min_x = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_y = f64::NEG_INFINITY;
        for &(x, y) in &self.points {
            min_x = min_x.min(x);
            max_x = max_x.max(x);
            min_y = min_y.min(y);
            max_y = max_y.max(y);
        }
        (min_x, max_x, min_y, max_y)
    }
}

fn counter_clockwise(points: &[(f64, f64)], v: [usize; 3]) -> [usize; 3] {
    if signed_area(points, v) < 0.0 {
        [v[0], v[2], v[1]]
    } else {
        v
    }
}

/// 삼각분할의 바깥 경계가 오목한 곳을 삼각형으로 메워 볼록 껍질과 일치시킨다.
///
/// 초기 삼각형과 함께 잘려 나간 껍질 삼각형을 복구한다. 경계가 단일 반시계 순환이
/// 아니면 손대지 않는다.
fn close_hull(points: &[(f64, f64)], triangles: &mut Vec<[usize; 3]>, min_area: f64) {
    while let Some(cycle) = boundary_cycle(triangles) {
        let m = cycle.len();
        let ear = (0..m).find_map(|k| {
            let (a, b, c) = (cycle[k], cycle[(k + 1) % m], cycle[(k + 2) % m]);
            // 반시계 경계에서 오른쪽으로 꺾이면 오목
            if signed_area(points, [a, b, c]) >= -min_area {
                return None;
            }
            let ear = [a, c, b];
            let blocked = points
                .iter()
                .enumerate()
                .any(|(i, p)| i != a && i != b && i != c && covers(points, ear, *p));
            (!blocked).then_some(ear)
        });
        match ear {
            Some(ear) => triangles.push(ear),
            None => return,
        }
    }
}

/// 반시계 방향 삼각형들의 바깥 경계를 한 바퀴 순서대로 돌려준다.
fn boundary_cycle(triangles: &[[usize; 3]]) -> Option<Vec<usize>> {
    let edges: HashSet<(usize, usize)> = triangles
        .iter()
        .flat_map(|t| [(t[0], t[1]), (t[1], t[2]), (t[2], t[0])])
        .collect();
    let mut next = HashMap::new();
    for &(u, v) in &edges {
        if !edges.contains(&(v, u)) && next.insert(u, v).is_some() {
            return None;
        }
    }
    let start = *next.keys().min()?;
    let mut cycle = vec![start];
    let mut current = *next.get(&start)?;
    while current != start {
        if cycle.len() > next.len() {
            return None;
        }
        cycle.push(current);
        current = *next.get(&current)?;
    }
    (cycle.len() == next.len()).then_some(cycle)
}

/// 반시계 삼각형 `v`가 점 `p`를 (경계 포함) 덮는지 여부.
fn covers(points: &[(f64, f64)], v: [usize; 3], p: (f64, f64)) -> bool {
    let cross =
        |a: (f64, f64), b: (f64, f64)| (b.0 - a.0) * (p.1 - a.1) - (p.0 - a.0) * (b.1 - a.1);
    let (p0, p1, p2) = (points[v[0]], points[v[1]], points[v[2]]);
    cross(p0, p1) >= 0.0 && cross(p1, p2) >= 0.0 && cross(p2, p0) >= 0.0
}

fn in_circumcircle(p: (f64, f64), tri: &Triangle) -> bool {
    let dx = p.0 - tri.circumcenter.0;
    let dy = p.1 - tri.circumcenter.1;
    dx * dx + dy * dy < tri.circumradius_sq * (1.0 - CIRCUMCIRCLE_REL_EPS)
}

fn has_edge(tri: &Triangle, (e0, e1): (usize, usize)) -> bool {
    [(0, 1), (1, 2), (2, 0)].iter().any(|&(a, b)| {
        let (o0, o1) = (tri.vertices[a], tri.vertices[b]);
        (o0 == e0 && o1 == e1) || (o0 == e1 && o1 == e0)
    })
}

fn signed_area(points: &[(f64, f64)], v: [usize; 3]) -> f64 {
    let (x0, y0) = points[v[0]];
    let (x1, y1) = points[v[1]];
    let (x2, y2) = points[v[2]];
    0.5 * ((x1 - x0) * (y2 - y0) - (x2 - x0) * (y1 - y0))
}
